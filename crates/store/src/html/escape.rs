//! Escaping and attribute sanitising for HTML output

use regex_lite::Regex;
use std::sync::OnceLock;
use tracing::warn;

/// Link target used when a URL scheme is not allowed
pub const BLANK_URL: &str = "about:blank";

const ALLOWED_SCHEMES: [&str; 4] = ["http:", "https:", "mailto:", "tel:"];

/// Append `text` with `& < > " '` escaped
pub fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

/// CSS named colors, sorted for binary search
const NAMED_COLORS: [&str; 148] = [
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white", "whitesmoke",
    "yellow", "yellowgreen",
];

fn color_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^#([0-9a-f]{3}|[0-9a-f]{6}|[0-9a-f]{8})$").ok())
        .as_ref()
}

/// Normalise a color value, or `None` when it is neither a hex color nor
/// a CSS color name. Rejected values are logged.
pub fn sanitize_color(raw: &str) -> Option<String> {
    let value = raw.trim().to_ascii_lowercase();
    let hex = color_pattern().is_some_and(|re| re.is_match(&value));
    if hex || NAMED_COLORS.binary_search(&value.as_str()).is_ok() {
        Some(value)
    } else {
        warn!(color = raw, "dropping unsupported color value");
        None
    }
}

/// Class suffix for a sanitised color: `#FF0000` becomes `ff0000`
pub fn color_token(color: &str) -> &str {
    color.trim_start_matches('#')
}

/// Return the URL when its scheme is allowed, otherwise [`BLANK_URL`]
pub fn sanitize_url(raw: &str) -> &str {
    let url = raw.trim();
    let lower = url.to_ascii_lowercase();
    if ALLOWED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        url
    } else {
        warn!(url = raw, "replacing link with disallowed scheme");
        BLANK_URL
    }
}

/// Image sources additionally allow inline `data:image/` payloads
pub fn sanitize_src(raw: &str) -> &str {
    let src = raw.trim();
    if src.to_ascii_lowercase().starts_with("data:image/") {
        src
    } else {
        sanitize_url(src)
    }
}
