pub async fn get_index() -> &'static str {
    "[ok]"
}
