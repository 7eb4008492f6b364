//! Server-rendered HTML for the website routes.
//!
//! Pages are deliberately plain: a shared shell plus small per-page body
//! builders. Everything user-controlled passes through [`escape`].

use til_core::{Acronym, Category, PublicUser};

/// Minimal HTML entity escaping for text nodes and attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shared page shell.
pub fn layout(title: &str, logged_in: bool, body: &str) -> String {
    let nav = if logged_in {
        r#"<a href="/">Home</a> <a href="/users">Users</a> <a href="/categories">Categories</a> <a href="/acronyms/create">New Acronym</a> <form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>"#
    } else {
        r#"<a href="/">Home</a> <a href="/users">Users</a> <a href="/categories">Categories</a> <a href="/login">Log in</a> <a href="/register">Register</a>"#
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} | TIL</title>\n</head>\n<body>\n<nav>{}</nav>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        nav,
        body
    )
}

fn acronym_list(acronyms: &[Acronym]) -> String {
    if acronyms.is_empty() {
        return "<p>There aren't any acronyms yet!</p>".to_string();
    }
    let items: String = acronyms
        .iter()
        .map(|a| {
            format!(
                "<li><a href=\"/acronyms/{}\">{}</a> — {}</li>",
                a.id,
                escape(&a.short),
                escape(&a.long)
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}

pub fn index(acronyms: &[Acronym], logged_in: bool) -> String {
    let body = format!("<h1>Acronyms</h1>{}", acronym_list(acronyms));
    layout("Homepage", logged_in, &body)
}

pub fn acronym_detail(
    acronym: &Acronym,
    user: &PublicUser,
    categories: &[Category],
    logged_in: bool,
) -> String {
    let cats = if categories.is_empty() {
        String::new()
    } else {
        let items: String = categories
            .iter()
            .map(|c| format!("<li><a href=\"/categories/{}\">{}</a></li>", c.id, escape(&c.name)))
            .collect();
        format!("<h2>Categories</h2><ul>{}</ul>", items)
    };

    let actions = if logged_in {
        format!(
            "<p><a href=\"/acronyms/{id}/edit\">Edit</a></p>\n<form method=\"post\" action=\"/acronyms/{id}/delete\"><button type=\"submit\">Delete</button></form>",
            id = acronym.id
        )
    } else {
        String::new()
    };

    let body = format!(
        "<h1>{}</h1>\n<h2>{}</h2>\n<p>Created by <a href=\"/users/{}\">{}</a></p>\n{}\n{}",
        escape(&acronym.short),
        escape(&acronym.long),
        user.id,
        escape(&user.name),
        cats,
        actions
    );
    layout(&acronym.short, logged_in, &body)
}

pub fn user_detail(user: &PublicUser, acronyms: &[Acronym], logged_in: bool) -> String {
    let body = format!(
        "<h1>{}</h1>\n<h2>@{}</h2>\n{}",
        escape(&user.name),
        escape(&user.username),
        acronym_list(acronyms)
    );
    layout(&user.name, logged_in, &body)
}

pub fn all_users(users: &[PublicUser], logged_in: bool) -> String {
    let list = if users.is_empty() {
        "<p>There aren't any users yet!</p>".to_string()
    } else {
        let items: String = users
            .iter()
            .map(|u| {
                format!(
                    "<li><a href=\"/users/{}\">{}</a> (@{})</li>",
                    u.id,
                    escape(&u.name),
                    escape(&u.username)
                )
            })
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout("All Users", logged_in, &format!("<h1>All Users</h1>{}", list))
}

pub fn all_categories(categories: &[Category], logged_in: bool) -> String {
    let list = if categories.is_empty() {
        "<p>There aren't any categories yet!</p>".to_string()
    } else {
        let items: String = categories
            .iter()
            .map(|c| format!("<li><a href=\"/categories/{}\">{}</a></li>", c.id, escape(&c.name)))
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout(
        "All Categories",
        logged_in,
        &format!("<h1>All Categories</h1>{}", list),
    )
}

pub fn category_detail(category: &Category, acronyms: &[Acronym], logged_in: bool) -> String {
    let body = format!("<h1>{}</h1>{}", escape(&category.name), acronym_list(acronyms));
    layout(&category.name, logged_in, &body)
}

pub fn login(error: Option<&str>, google_enabled: bool) -> String {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape(e)))
        .unwrap_or_default();
    let google = if google_enabled {
        r#"<p><a href="/login-google">Log in with Google</a></p>"#
    } else {
        ""
    };
    let body = format!(
        "<h1>Log In</h1>\n{}\n<form method=\"post\" action=\"/login\">\n<label>Username <input type=\"text\" name=\"username\" required></label>\n<label>Password <input type=\"password\" name=\"password\" required></label>\n<button type=\"submit\">Log in</button>\n</form>\n{}",
        error_html, google
    );
    layout("Log In", false, &body)
}

pub fn register(error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape(e)))
        .unwrap_or_default();
    let body = format!(
        "<h1>Register</h1>\n{}\n<form method=\"post\" action=\"/register\">\n<label>Name <input type=\"text\" name=\"name\" required></label>\n<label>Username <input type=\"text\" name=\"username\" required></label>\n<label>Email <input type=\"email\" name=\"email\" required></label>\n<label>Password <input type=\"password\" name=\"password\" required></label>\n<button type=\"submit\">Register</button>\n</form>",
        error_html
    );
    layout("Register", false, &body)
}

/// Shared form for create and edit. On edit, current values pre-fill the
/// fields and attached category names populate the categories input.
pub fn acronym_form(editing: Option<&Acronym>, categories: &[Category]) -> String {
    let (title, action) = match editing {
        Some(a) => ("Edit Acronym".to_string(), format!("/acronyms/{}/edit", a.id)),
        None => ("Create An Acronym".to_string(), "/acronyms/create".to_string()),
    };
    let short = editing.map(|a| escape(&a.short)).unwrap_or_default();
    let long = editing.map(|a| escape(&a.long)).unwrap_or_default();
    let category_inputs: String = categories
        .iter()
        .map(|c| {
            format!(
                "<input type=\"text\" name=\"categories\" value=\"{}\">",
                escape(&c.name)
            )
        })
        .collect();

    let body = format!(
        "<h1>{title}</h1>\n<form method=\"post\" action=\"{action}\">\n<label>Acronym <input type=\"text\" name=\"short\" value=\"{short}\" required></label>\n<label>Meaning <input type=\"text\" name=\"long\" value=\"{long}\" required></label>\n<fieldset><legend>Categories</legend>{category_inputs}<input type=\"text\" name=\"categories\" value=\"\"><input type=\"text\" name=\"categories\" value=\"\"></fieldset>\n<button type=\"submit\">Submit</button>\n</form>",
    );
    layout(&title, true, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_escape_covers_html_metacharacters() {
        assert_eq!(
            escape(r#"<script>alert("x&'y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;&#39;y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_index_empty_state() {
        let html = index(&[], false);
        assert!(html.contains("There aren't any acronyms yet!"));
        assert!(html.contains("Log in"));
    }

    #[test]
    fn test_acronym_form_escapes_user_content() {
        let acronym = Acronym {
            id: Uuid::new_v4(),
            short: "<OMG>".to_string(),
            long: "Oh \"My\" God".to_string(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let html = acronym_form(Some(&acronym), &[]);
        assert!(html.contains("&lt;OMG&gt;"));
        assert!(html.contains("Oh &quot;My&quot; God"));
        assert!(!html.contains("<OMG>"));
    }

    #[test]
    fn test_edit_form_prefills_categories() {
        let acronym = Acronym {
            id: Uuid::new_v4(),
            short: "OMG".to_string(),
            long: "Oh My God".to_string(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let category = Category {
            id: Uuid::new_v4(),
            name: "Funny".to_string(),
            created_at: Utc::now(),
        };
        let html = acronym_form(Some(&acronym), &[category]);
        assert!(html.contains(r#"name="categories" value="Funny""#));
    }

    #[test]
    fn test_login_shows_google_link_only_when_enabled() {
        assert!(login(None, true).contains("/login-google"));
        assert!(!login(None, false).contains("/login-google"));
    }
}
