use crate::variables::VariableTable;

pub const BASE_URL_TOKEN: &str = "{{baseUrl}}";

/// Joins with exactly one `/` however many slashes each side brings.
pub fn join_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Resolves the `baseUrl` variable and the endpoint, then joins them.
pub fn assemble_url(endpoint: &str, table: &VariableTable) -> String {
    let base = table.resolve(BASE_URL_TOKEN);
    join_url(&base, &table.resolve(endpoint))
}
