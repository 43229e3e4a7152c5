//! Prompts for SQL query synthesis.

/// System prompt for the query-synthesis collaborator.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that writes SQL queries for a clinical testing database. You always answer with exactly one query and nothing else.";

/// User prompt template for a reporting request.
pub fn make_query_prompt(schema: &str, request: &str) -> String {
    format!(
        r#"Here is the database schema:

{}

The user has requested the following:
{}

Reply with the query only. No explanation, no surrounding text, no markdown,
just the single query, like: "SELECT * FROM some_table""#,
        schema, request
    )
}
