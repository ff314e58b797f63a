//! REST Data Source
//!
//! Strapi `/api/todos` collection. Query strings use Strapi's bracket
//! syntax (`filters[todo][$contains]=...`); bodies are wrapped in `data`.

use async_trait::async_trait;
use list_view::{DataSource, Draft, Page, QueryParams, Record, RecordId, SourceError, SourceResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::ApiClient;
use crate::models::{draft_to_input, page_from_nodes, IntoRecord, PageInfo, TodoNode, TODO_SCHEMA};

/// RFC 3986 unreserved characters pass through
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Deserialize)]
struct ListBody<N> {
    data: Vec<N>,
    meta: ListMeta,
}

#[derive(Deserialize)]
struct ListMeta {
    pagination: PageInfo,
}

#[derive(Deserialize)]
struct ItemBody<N> {
    data: N,
}

#[derive(Deserialize)]
struct IdOnly {
    #[serde(rename = "documentId")]
    document_id: String,
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// `todos?...` path for one list request
pub fn todos_list_path(params: &QueryParams) -> String {
    let mut query = vec![
        format!("pagination[page]={}", params.page_index + 1),
        format!("pagination[pageSize]={}", params.page_size),
        "populate[userId][fields][0]=documentId".to_string(),
        "sort[0]=createdAt:desc".to_string(),
    ];
    if let Some(search) = params.active_search() {
        let filter_key = match params.filter_attribute.as_str() {
            "todo" => Some("filters[todo][$contains]"),
            "userId" => Some("filters[userId][documentId][$eq]"),
            "id" => Some("filters[documentId][$eq]"),
            _ => None,
        };
        if let Some(key) = filter_key {
            query.push(format!("{}={}", key, encode(search)));
        }
    }
    format!("todos?{}", query.join("&"))
}

fn todo_path(id: &RecordId) -> String {
    format!("todos/{}", encode(id.as_str()))
}

fn into_record(node: TodoNode) -> SourceResult<Record> {
    node.into_record()
        .ok_or_else(|| SourceError::Transport("server returned a record without an id".to_string()))
}

pub struct RestTodos {
    client: ApiClient,
}

impl RestTodos {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn write(&self, method: Method, path: &str, draft: &Draft) -> SourceResult<Record> {
        let body = json!({ "data": draft_to_input(&TODO_SCHEMA, draft) });
        let response: Option<ItemBody<TodoNode>> = self.client.rest(method, path, Some(body)).await?;
        let item = response.ok_or_else(|| SourceError::Transport("empty response body".to_string()))?;
        into_record(item.data)
    }
}

#[async_trait(?Send)]
impl DataSource for RestTodos {
    async fn list_page(&self, params: &QueryParams) -> SourceResult<Page> {
        let path = todos_list_path(params);
        log::debug!("GET /api/{}", path);
        let body: Option<ListBody<TodoNode>> = self.client.rest(Method::GET, &path, None).await?;
        match body {
            Some(body) => Ok(page_from_nodes(body.data, &body.meta.pagination)),
            None => Ok(Page::empty(params.page_size)),
        }
    }

    async fn create(&self, draft: &Draft) -> SourceResult<Record> {
        self.write(Method::POST, "todos", draft).await
    }

    async fn update(&self, id: &RecordId, draft: &Draft) -> SourceResult<Record> {
        self.write(Method::PUT, &todo_path(id), draft).await
    }

    async fn delete(&self, id: &RecordId) -> SourceResult<()> {
        let _: Option<serde_json::Value> = self.client.rest(Method::DELETE, &todo_path(id), None).await?;
        Ok(())
    }

    async fn list_related(&self, field: &str) -> SourceResult<Vec<RecordId>> {
        if field != "userId" {
            return Ok(Vec::new());
        }
        let path = format!(
            "employees?pagination[pageSize]={}&fields[0]=documentId",
            self.client.config().related_limit
        );
        let body: Option<ItemBody<Vec<IdOnly>>> = self.client.rest(Method::GET, &path, None).await?;
        Ok(body
            .map(|b| b.data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|node| RecordId::new(node.document_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_path_without_search() {
        let params = QueryParams::new("todo", 10);
        assert_eq!(
            todos_list_path(&params),
            "todos?pagination[page]=1&pagination[pageSize]=10&populate[userId][fields][0]=documentId&sort[0]=createdAt:desc"
        );
    }

    #[test]
    fn test_list_path_encodes_search_value() {
        let mut params = QueryParams::new("todo", 5);
        params.search_text = " milk & eggs ".to_string();
        params.page_index = 1;
        let path = todos_list_path(&params);
        assert!(path.contains("pagination[page]=2"));
        assert!(path.ends_with("filters[todo][$contains]=milk%20%26%20eggs"));
    }

    #[test]
    fn test_list_path_reference_filter() {
        let mut params = QueryParams::new("userId", 10);
        params.search_text = "emp1".to_string();
        assert!(todos_list_path(&params).ends_with("filters[userId][documentId][$eq]=emp1"));
    }

    #[test]
    fn test_list_body_decodes() {
        let body: ListBody<TodoNode> = serde_json::from_str(
            r#"{"data":[{"id":3,"documentId":"t3","todo":"Call mom","completed":false,"userId":{"documentId":"e2"}}],
                "meta":{"pagination":{"page":1,"pageSize":10,"pageCount":1,"total":1}}}"#,
        )
        .unwrap();
        let page = page_from_nodes(body.data, &body.meta.pagination);
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].id.as_str(), "t3");
    }
}
