//! Literal token substitution for the page and feed templates.

pub const TOKEN_TITLE: &str = "$site:title";
pub const TOKEN_NAME: &str = "$site:name";
pub const TOKEN_STYLE: &str = "$site:style";
pub const TOKEN_NAV: &str = "$site:nav";
pub const TOKEN_BODY: &str = "$site:body";
pub const TOKEN_LINK: &str = "$site:link";
pub const TOKEN_EDIT: &str = "$site:edit";
pub const TOKEN_UPDATED: &str = "$site:updated";
pub const TOKEN_YEAR: &str = "$site:year";
pub const TOKEN_POSTS: &str = "$site:posts";

/// Strips template author indentation: every line loses leading and
/// trailing whitespace, lines are rejoined with newlines. Run once per
/// template per build.
pub fn preprocess(template: &str) -> String {
    template
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Exact literal replacement over the fixed token vocabulary. No token is a
/// prefix of another, so sequential replacement cannot overlap.
pub fn substitute(template: &str, tokens: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (token, value) in tokens {
        out = out.replace(token, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_trims_each_line() {
        let template = "  <html>\n\t<body>$site:body</body>  \n  </html>";
        assert_eq!(preprocess(template), "<html>\n<body>$site:body</body>\n</html>");
    }

    #[test]
    fn substitute_replaces_every_occurrence() {
        let out = substitute(
            "$site:title / $site:name / $site:title",
            &[(TOKEN_TITLE, "wiki"), (TOKEN_NAME, "Home")],
        );
        assert_eq!(out, "wiki / Home / wiki");
    }

    #[test]
    fn substitute_leaves_unknown_text_alone() {
        let out = substitute("$site:unknown stays", &[(TOKEN_TITLE, "wiki")]);
        assert_eq!(out, "$site:unknown stays");
    }

    #[test]
    fn nav_and_name_tokens_do_not_collide() {
        let out = substitute(
            "$site:nav|$site:name",
            &[(TOKEN_NAME, "Home"), (TOKEN_NAV, "<ul></ul>")],
        );
        assert_eq!(out, "<ul></ul>|Home");
    }
}
