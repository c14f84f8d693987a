use chrono::DateTime;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Returned whenever the listing JSON does not match the expected
/// two-element `[post, comments]` shape. The renderer degrades to this
/// string instead of raising.
pub const NO_CONTENT: &str = "No content extracted from Reddit thread.";

#[derive(Debug)]
struct RedditComment {
    author: String,
    body: String,
    score: i64,
    created_utc: f64,
    replies: Vec<RedditComment>,
}

#[derive(Debug)]
struct RedditPost {
    title: String,
    author: String,
    selftext: String,
    score: i64,
    upvote_ratio: f64,
    created_utc: f64,
    num_comments: i64,
    comments: Vec<RedditComment>,
}

/// Render a Reddit listing (`[post_listing, comment_listing]`) as Markdown:
/// a level-1 title, one metadata line, the post body, then the comment tree
/// with nesting expressed as blockquote chaining (`> ` per depth level).
pub fn reddit_json_to_markdown(listing: &Value) -> String {
    match render(listing) {
        Some(markdown) => markdown,
        None => {
            warn!("Reddit listing did not match the expected shape");
            NO_CONTENT.to_string()
        }
    }
}

fn render(listing: &Value) -> Option<String> {
    let parts = listing.as_array()?;
    if parts.len() < 2 {
        return None;
    }

    let post_value = parts[0].get("data")?.get("children")?.get(0)?;
    let mut post = parse_post(post_value)?;

    if let Some(children) = parts[1].get("data").and_then(|d| d.get("children")).and_then(Value::as_array) {
        for child in children {
            if let Some(comment) = parse_comment(child) {
                post.comments.push(comment);
            }
        }
    }

    let mut lines = Vec::new();
    lines.push(format!("# {}", post.title));
    lines.push(String::new());
    lines.push(format!(
        "**u/{}** — {} points, {:.0}% upvoted, {} comments — {}",
        post.author,
        post.score,
        post.upvote_ratio * 100.0,
        post.num_comments,
        format_timestamp(post.created_utc)
    ));

    if !post.selftext.trim().is_empty() {
        lines.push(String::new());
        lines.push(post.selftext.trim().to_string());
    }

    if !post.comments.is_empty() {
        lines.push(String::new());
        lines.push("## Comments".to_string());
        lines.push(String::new());
        for comment in &post.comments {
            format_comment(comment, 0, &mut lines);
        }
    }

    Some(lines.join("\n"))
}

fn format_comment(comment: &RedditComment, depth: usize, lines: &mut Vec<String>) {
    // Deleted/removed comments carry no readable body; skip the subtree.
    let body = comment.body.trim();
    if body.is_empty() || body == "[deleted]" || body == "[removed]" {
        return;
    }

    if depth == 0 {
        lines.push(format!(
            "### u/{} ({} points) — {}",
            comment.author,
            comment.score,
            format_timestamp(comment.created_utc)
        ));
        for line in body.lines() {
            lines.push(line.to_string());
        }
    } else {
        let quote = "> ".repeat(depth);
        lines.push(format!(
            "{quote}**u/{}** ({} points):",
            comment.author, comment.score
        ));
        for line in body.lines() {
            lines.push(format!("{quote}{line}"));
        }
    }
    lines.push(String::new());

    for reply in &comment.replies {
        format_comment(reply, depth + 1, lines);
    }
}

fn parse_post(value: &Value) -> Option<RedditPost> {
    if value.get("kind")?.as_str()? != "t3" {
        return None;
    }
    let data = value.get("data")?;
    Some(RedditPost {
        title: string_field(data, "title"),
        author: author_field(data),
        selftext: string_field(data, "selftext"),
        score: data.get("score").and_then(Value::as_i64).unwrap_or(0),
        upvote_ratio: data.get("upvote_ratio").and_then(Value::as_f64).unwrap_or(0.0),
        created_utc: data.get("created_utc").and_then(Value::as_f64).unwrap_or(0.0),
        num_comments: data.get("num_comments").and_then(Value::as_i64).unwrap_or(0),
        comments: Vec::new(),
    })
}

fn parse_comment(value: &Value) -> Option<RedditComment> {
    if value.get("kind")?.as_str()? != "t1" {
        return None;
    }
    let data = value.get("data")?;
    let mut comment = RedditComment {
        author: author_field(data),
        body: string_field(data, "body"),
        score: data.get("score").and_then(Value::as_i64).unwrap_or(0),
        created_utc: data.get("created_utc").and_then(Value::as_f64).unwrap_or(0.0),
        replies: Vec::new(),
    };

    // `replies` is a nested listing when present, an empty string when not.
    if let Some(children) = data
        .get("replies")
        .and_then(|r| r.get("data"))
        .and_then(|d| d.get("children"))
        .and_then(Value::as_array)
    {
        for child in children {
            if let Some(reply) = parse_comment(child) {
                comment.replies.push(reply);
            }
        }
    }

    Some(comment)
}

fn string_field(data: &Value, key: &str) -> String {
    data.get(key).and_then(Value::as_str).unwrap_or("").to_string()
}

fn author_field(data: &Value) -> String {
    data.get("author")
        .and_then(Value::as_str)
        .unwrap_or("[deleted]")
        .to_string()
}

fn format_timestamp(timestamp: f64) -> String {
    match DateTime::from_timestamp(timestamp as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

/// Strip `[text](url)` constructs down to their anchor text, then remove
/// any remaining bare `http(s)://…` tokens. Applied to Reddit output so
/// untrusted outbound links never reach an LLM context.
pub fn strip_links(markdown: &str) -> String {
    let re_inline = Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("static regex");
    let without_inline = re_inline.replace_all(markdown, "$1");
    let re_bare = Regex::new(r"https?://\S+").expect("static regex");
    re_bare.replace_all(&without_inline, "").into_owned()
}
