//! GraphQL Data Sources
//!
//! Strapi `todos_connection` / `employees_connection` queries and the
//! matching create/update/delete mutations.

use async_trait::async_trait;
use list_view::{DataSource, Draft, Page, QueryParams, Record, RecordId, SourceError, SourceResult};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiClient, ApiError};
use crate::models::{draft_to_input, page_from_nodes, EmployeeNode, IntoRecord, PageInfo, TodoNode, EMPLOYEE_SCHEMA, TODO_SCHEMA};

// ========================
// Documents
// ========================

const TODO_FIELDS: &str = "documentId todo completed userId { documentId FirstName LastName }";
const EMPLOYEE_FIELDS: &str = "documentId FirstName LastName UserName Email Age";

fn todos_query() -> String {
    format!(
        "query GetTodos($page: Int, $pageSize: Int, $filters: TodoFiltersInput) {{
  todos_connection(pagination: {{ page: $page, pageSize: $pageSize }}, filters: $filters) {{
    nodes {{ {TODO_FIELDS} }}
    pageInfo {{ page pageSize pageCount total }}
  }}
}}"
    )
}

fn employees_query() -> String {
    format!(
        "query GetEmployees($page: Int, $pageSize: Int, $filters: EmployeeFiltersInput) {{
  employees_connection(pagination: {{ page: $page, pageSize: $pageSize }}, filters: $filters) {{
    nodes {{ {EMPLOYEE_FIELDS} }}
    pageInfo {{ page pageSize pageCount total }}
  }}
}}"
    )
}

const EMPLOYEE_TODOS_QUERY: &str = "query GetEmployee($documentId: ID!) {
  employee(documentId: $documentId) { documentId todos { documentId todo completed } }
}";

const EMPLOYEE_IDS_QUERY: &str = "query GetEmployeeIds($pageSize: Int) {
  employees_connection(pagination: { page: 1, pageSize: $pageSize }) { nodes { documentId } }
}";

fn mutation(name: &str, input_type: &str, fields: &str, with_id: bool) -> String {
    if with_id {
        format!(
            "mutation {name}($documentId: ID!, $data: {input_type}!) {{ {op}(documentId: $documentId, data: $data) {{ {fields} }} }}",
            op = lower_first(name)
        )
    } else {
        format!(
            "mutation {name}($data: {input_type}!) {{ {op}(data: $data) {{ {fields} }} }}",
            op = lower_first(name)
        )
    }
}

fn delete_mutation(name: &str) -> String {
    format!(
        "mutation {name}($documentId: ID!) {{ {op}(documentId: $documentId) {{ documentId }} }}",
        op = lower_first(name)
    )
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ========================
// Filters
// ========================

/// `TodoFiltersInput` for the selected attribute, or `None` when not searching
pub fn todo_filters(params: &QueryParams) -> Option<Value> {
    let search = params.active_search()?;
    match params.filter_attribute.as_str() {
        "todo" => Some(json!({ "todo": { "contains": search } })),
        "userId" => Some(json!({ "userId": { "documentId": { "eq": search } } })),
        "id" => Some(json!({ "documentId": { "eq": search } })),
        _ => None,
    }
}

/// `EmployeeFiltersInput` for the selected attribute
pub fn employee_filters(params: &QueryParams) -> Option<Value> {
    let search = params.active_search()?;
    match params.filter_attribute.as_str() {
        "name" => Some(json!({
            "or": [
                { "FirstName": { "containsi": search } },
                { "LastName": { "containsi": search } }
            ]
        })),
        "email" => Some(json!({ "Email": { "containsi": search } })),
        "id" => Some(json!({ "documentId": { "eq": search } })),
        _ => None,
    }
}

fn page_variables(params: &QueryParams, filters: Option<Value>) -> Value {
    json!({
        "page": params.page_index + 1,
        "pageSize": params.page_size,
        "filters": filters,
    })
}

/// A `null` mutation payload means the document is gone; anything else is a
/// transport or server error.
fn not_found_if_empty(id: &RecordId) -> impl Fn(ApiError) -> SourceError + '_ {
    move |err| match err {
        ApiError::Empty => SourceError::NotFound(id.to_string()),
        other => SourceError::from(other),
    }
}

fn record_or_transport<N: IntoRecord>(node: N) -> SourceResult<Record> {
    node.into_record()
        .ok_or_else(|| SourceError::Transport("server returned a record without an id".to_string()))
}

// ========================
// Response Shapes
// ========================

#[derive(Deserialize)]
struct Connection<N> {
    nodes: Vec<N>,
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
}

#[derive(Deserialize)]
struct TodosData {
    todos_connection: Connection<TodoNode>,
}

#[derive(Deserialize)]
struct EmployeesData {
    employees_connection: Connection<EmployeeNode>,
}

#[derive(Deserialize)]
struct IdNode {
    #[serde(rename = "documentId")]
    document_id: String,
}

#[derive(Deserialize)]
struct EmployeeTodosData {
    employee: Option<EmployeeTodos>,
}

#[derive(Deserialize)]
struct EmployeeTodos {
    #[serde(default)]
    todos: Vec<TodoNode>,
}

#[derive(Deserialize)]
struct EmployeeIdsData {
    employees_connection: IdConnection,
}

#[derive(Deserialize)]
struct IdConnection {
    nodes: Vec<IdNode>,
}

async fn employee_ids(client: &ApiClient) -> Result<Vec<RecordId>, ApiError> {
    let data: EmployeeIdsData = client
        .graphql(EMPLOYEE_IDS_QUERY, json!({ "pageSize": client.config().related_limit }))
        .await?;
    Ok(data
        .employees_connection
        .nodes
        .into_iter()
        .filter_map(|n| RecordId::new(n.document_id))
        .collect())
}

/// Take the single field of a mutation's `data` object
fn mutation_payload<N: serde::de::DeserializeOwned>(data: Value) -> Result<N, ApiError> {
    let payload = match data {
        Value::Object(map) => map.into_iter().next().map(|(_, v)| v).ok_or(ApiError::Empty)?,
        _ => return Err(ApiError::Empty),
    };
    if payload.is_null() {
        return Err(ApiError::Empty);
    }
    Ok(serde_json::from_value(payload)?)
}

// ========================
// Todos
// ========================

pub struct GraphqlTodos {
    client: ApiClient,
}

impl GraphqlTodos {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl DataSource for GraphqlTodos {
    async fn list_page(&self, params: &QueryParams) -> SourceResult<Page> {
        let variables = page_variables(params, todo_filters(params));
        let data: TodosData = self.client.graphql(&todos_query(), variables).await?;
        let connection = data.todos_connection;
        Ok(page_from_nodes(connection.nodes, &connection.page_info))
    }

    async fn create(&self, draft: &Draft) -> SourceResult<Record> {
        let document = mutation("CreateTodo", "TodoInput", TODO_FIELDS, false);
        let variables = json!({ "data": draft_to_input(&TODO_SCHEMA, draft) });
        let data: Value = self.client.graphql(&document, variables).await?;
        record_or_transport(mutation_payload::<TodoNode>(data)?)
    }

    async fn update(&self, id: &RecordId, draft: &Draft) -> SourceResult<Record> {
        let document = mutation("UpdateTodo", "TodoInput", TODO_FIELDS, true);
        let variables = json!({ "documentId": id.as_str(), "data": draft_to_input(&TODO_SCHEMA, draft) });
        let data: Value = self.client.graphql(&document, variables).await?;
        let node = mutation_payload::<TodoNode>(data).map_err(not_found_if_empty(id))?;
        record_or_transport(node)
    }

    async fn delete(&self, id: &RecordId) -> SourceResult<()> {
        let data: Value = self
            .client
            .graphql(&delete_mutation("DeleteTodo"), json!({ "documentId": id.as_str() }))
            .await?;
        mutation_payload::<IdNode>(data).map_err(not_found_if_empty(id))?;
        Ok(())
    }

    async fn list_related(&self, field: &str) -> SourceResult<Vec<RecordId>> {
        match field {
            "userId" => Ok(employee_ids(&self.client).await?),
            _ => Ok(Vec::new()),
        }
    }
}

// ========================
// Employees
// ========================

pub struct GraphqlEmployees {
    client: ApiClient,
}

impl GraphqlEmployees {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl DataSource for GraphqlEmployees {
    async fn list_page(&self, params: &QueryParams) -> SourceResult<Page> {
        let variables = page_variables(params, employee_filters(params));
        let data: EmployeesData = self.client.graphql(&employees_query(), variables).await?;
        let connection = data.employees_connection;
        Ok(page_from_nodes(connection.nodes, &connection.page_info))
    }

    async fn create(&self, draft: &Draft) -> SourceResult<Record> {
        let document = mutation("CreateEmployee", "EmployeeInput", EMPLOYEE_FIELDS, false);
        let variables = json!({ "data": draft_to_input(&EMPLOYEE_SCHEMA, draft) });
        let data: Value = self.client.graphql(&document, variables).await?;
        record_or_transport(mutation_payload::<EmployeeNode>(data)?)
    }

    async fn update(&self, id: &RecordId, draft: &Draft) -> SourceResult<Record> {
        let document = mutation("UpdateEmployee", "EmployeeInput", EMPLOYEE_FIELDS, true);
        let variables = json!({ "documentId": id.as_str(), "data": draft_to_input(&EMPLOYEE_SCHEMA, draft) });
        let data: Value = self.client.graphql(&document, variables).await?;
        let node = mutation_payload::<EmployeeNode>(data).map_err(not_found_if_empty(id))?;
        record_or_transport(node)
    }

    async fn delete(&self, id: &RecordId) -> SourceResult<()> {
        let data: Value = self
            .client
            .graphql(&delete_mutation("DeleteEmployee"), json!({ "documentId": id.as_str() }))
            .await?;
        mutation_payload::<IdNode>(data).map_err(not_found_if_empty(id))?;
        Ok(())
    }

    /// The employee's assigned todos
    async fn list_children(&self, id: &RecordId) -> SourceResult<Vec<Record>> {
        let data: EmployeeTodosData = self
            .client
            .graphql(EMPLOYEE_TODOS_QUERY, json!({ "documentId": id.as_str() }))
            .await?;
        let employee = data.employee.ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        Ok(employee.todos.into_iter().filter_map(IntoRecord::into_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(attr: &str, search: &str) -> QueryParams {
        QueryParams {
            search_text: search.to_string(),
            filter_attribute: attr.to_string(),
            page_index: 0,
            page_size: 10,
        }
    }

    #[test]
    fn test_todo_filters_per_attribute() {
        assert_eq!(todo_filters(&params("todo", "milk")), Some(json!({ "todo": { "contains": "milk" } })));
        assert_eq!(
            todo_filters(&params("userId", "e1")),
            Some(json!({ "userId": { "documentId": { "eq": "e1" } } }))
        );
        assert_eq!(todo_filters(&params("id", " t9 ")), Some(json!({ "documentId": { "eq": "t9" } })));
        assert_eq!(todo_filters(&params("todo", "   ")), None);
    }

    #[test]
    fn test_employee_name_filter_matches_either_name() {
        let filters = employee_filters(&params("name", "ada")).unwrap();
        assert_eq!(filters["or"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_page_variables_are_one_based() {
        let mut p = params("todo", "");
        p.page_index = 2;
        let vars = page_variables(&p, todo_filters(&p));
        assert_eq!(vars, json!({ "page": 3, "pageSize": 10, "filters": null }));
    }

    #[test]
    fn test_mutation_documents() {
        assert_eq!(
            delete_mutation("DeleteTodo"),
            "mutation DeleteTodo($documentId: ID!) { deleteTodo(documentId: $documentId) { documentId } }"
        );
        assert!(mutation("UpdateEmployee", "EmployeeInput", EMPLOYEE_FIELDS, true)
            .contains("updateEmployee(documentId: $documentId, data: $data)"));
    }

    #[test]
    fn test_mutation_payload_takes_single_field() {
        let data = json!({ "createTodo": { "documentId": "t5", "todo": "x", "completed": false, "userId": null } });
        let node: TodoNode = mutation_payload(data).unwrap();
        assert_eq!(node.document_id, "t5");
        assert!(matches!(mutation_payload::<TodoNode>(json!({ "updateTodo": null })), Err(ApiError::Empty)));
    }

    #[test]
    fn test_only_null_payload_means_not_found() {
        let doc = RecordId::new("t5").unwrap();
        let gone = mutation_payload::<IdNode>(json!({ "deleteTodo": null })).map_err(not_found_if_empty(&doc));
        assert!(matches!(gone, Err(SourceError::NotFound(ref id)) if id == "t5"));

        let garbled = mutation_payload::<IdNode>(json!({ "deleteTodo": { "wrong": 1 } })).map_err(not_found_if_empty(&doc));
        assert!(matches!(garbled, Err(SourceError::Transport(_))));
    }

    #[test]
    fn test_employee_todos_decode() {
        let data: EmployeeTodosData = serde_json::from_value(json!({
            "employee": {
                "documentId": "e1",
                "todos": [{ "documentId": "t1", "todo": "a", "completed": true }]
            }
        }))
        .unwrap();
        let todos: Vec<Record> = data.employee.unwrap().todos.into_iter().filter_map(IntoRecord::into_record).collect();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].field("completed"), &list_view::FieldValue::Flag(true));

        let missing: EmployeeTodosData = serde_json::from_value(json!({ "employee": null })).unwrap();
        assert!(missing.employee.is_none());
    }

    #[test]
    fn test_connection_response_decodes() {
        let data: TodosData = serde_json::from_value(json!({
            "todos_connection": {
                "nodes": [{ "documentId": "t1", "todo": "a", "completed": true, "userId": null }],
                "pageInfo": { "page": 1, "pageSize": 10, "pageCount": 1, "total": 1 }
            }
        }))
        .unwrap();
        let page = page_from_nodes(data.todos_connection.nodes, &data.todos_connection.page_info);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.page_index, 0);
    }
}
