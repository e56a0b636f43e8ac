use axum::{
    Form,
    extract::State,
    response::Html,
};
use serde::Deserialize;
use serde_json::json;

use crate::utils::{escape_html, name_digest};
use crate::web::AppState;

const ENDPOINT: &str = "/";

#[derive(Debug, Deserialize)]
pub struct NameForm {
    pub name: String,
}

/// `GET /`: the form pre-filled with the configured default name
pub async fn show_form(State(state): State<AppState>) -> Html<String> {
    let name = escape_html(&state.config.site.default_name);
    render(&state, &name)
}

/// `POST /`: echo the submitted name and link its identicon
pub async fn submit_name(State(state): State<AppState>, Form(form): Form<NameForm>) -> Html<String> {
    let name = escape_html(&form.name);
    state.events.info(
        format!("User submitted name: {name}"),
        json!({
            "endpoint": ENDPOINT,
            "form_data": { "name": name },
        }),
    );
    render(&state, &name)
}

fn render(state: &AppState, name: &str) -> Html<String> {
    let name_hash = name_digest(&state.config.site.salt, name);
    let page = home_page(name, &name_hash);

    state.events.info(
        format!("Main page rendered for: {name}"),
        json!({
            "endpoint": ENDPOINT,
            "name_hash": name_hash,
        }),
    );
    Html(page)
}

/// `name` must already be escaped
fn home_page(name: &str, name_hash: &str) -> String {
    format!(
        r#"<html><head><title>Identidock</title></head><body><form method="POST">
    Hello <input type="text" name="name" value="{name}">
    <input type="submit" value="submit">
    </form>
    <p>You look like a:
    <img src="/monster/{name_hash}"/>
    </body></html>"#
    )
}
