//! HTML pages.

use wikicache_core::SummaryRecord;

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n<body>\n{body}\n{}\n</body>\n</html>\n",
        escape(title),
        search_form(),
    )
}

fn search_form() -> &'static str {
    "<form action=\"/submit\" method=\"get\">\n\
     <input type=\"text\" name=\"query\" placeholder=\"Search the encyclopedia\" autofocus>\n\
     <button type=\"submit\">Search</button>\n\
     </form>"
}

/// The landing page.
pub fn home_page() -> String {
    layout("wikicache", "<h1>wikicache</h1>\n<p>Look up the summary of any encyclopedia article.</p>")
}

/// A summary with its title and a link to the full article.
pub fn summary_page(record: &SummaryRecord) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"{}\">Read the full article</a></p>",
        escape(&record.title),
        escape(&record.summary),
        escape(&record.page),
    );
    layout(&record.title, &body)
}

/// A page carrying a single message, used for every lookup error.
pub fn message_page(message: &str) -> String {
    layout("wikicache", &format!("<p class=\"message\">{}</p>", escape(message)))
}
