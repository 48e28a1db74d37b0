//! Server-rendered HTML pages

use crate::store::TodoList;

pub const PAGE_TITLE: &str = "To-Do lists";
pub const HOME_HEADER: &str = "Start a new To-Do list";
pub const LIST_HEADER: &str = "Your To-Do list";

/// Element ids the acceptance suite relies on
pub const INPUT_ID: &str = "id_new_item";
pub const TABLE_ID: &str = "id_list_table";

/// Name of the form field carrying the item text
pub const ITEM_FIELD: &str = "item_text";

/// Home page with an empty table and a form that starts a new list
pub fn home_page(placeholder: &str, error: Option<&str>) -> String {
    layout(HOME_HEADER, "/lists/new", placeholder, error, "")
}

/// Page showing an existing list with a form that appends to it
pub fn list_page(list: &TodoList, placeholder: &str, error: Option<&str>) -> String {
    let rows: String = list
        .rows()
        .iter()
        .map(|row| format!("\n        <tr><td>{}</td></tr>", escape_html(row)))
        .collect();
    let action = format!("{}add_item", list.url());

    layout(LIST_HEADER, &action, placeholder, error, &rows)
}

fn layout(header: &str, action: &str, placeholder: &str, error: Option<&str>, rows: &str) -> String {
    let error = error
        .map(|e| format!("\n      <div class=\"error\">{}</div>", escape_html(e)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
  </head>
  <body>
    <h1>{header}</h1>
    <form method="POST" action="{action}">
      <input id="{input_id}" name="{field}" placeholder="{placeholder}" autofocus />{error}
    </form>
    <table id="{table_id}">{rows}
    </table>
  </body>
</html>
"#,
        title = PAGE_TITLE,
        header = header,
        action = escape_html(action),
        input_id = INPUT_ID,
        field = ITEM_FIELD,
        placeholder = escape_html(placeholder),
        error = error,
        table_id = TABLE_ID,
        rows = rows,
    )
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
