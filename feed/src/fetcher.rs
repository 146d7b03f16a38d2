use ktap_shared::{DataEnvelope, ListResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FeedError, Result};
use crate::page::{ListQuery, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// JSON over HTTP against the KTap backend.
///
/// Implementations map transport errors to [`FeedError::FetchFailed`],
/// non-2xx answers to [`FeedError::RequestRejected`] and unparseable bodies
/// to [`FeedError::Decode`]. An empty success body decodes as JSON `null`.
/// They never retry.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn request<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned;

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.request::<(), R>(Method::Get, path, None).await
    }

    /// A mutation whose success body is `{ data }`.
    async fn send<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let envelope: DataEnvelope<R> = self.request(method, path, body).await?;
        envelope
            .data
            .ok_or_else(|| FeedError::Decode(format!("{} {path}: missing data", method.as_str())))
    }

    /// A mutation whose body, if any, is ignored.
    async fn send_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.request::<B, serde::de::IgnoredAny>(method, path, body)
            .await
            .map(|_| ())
    }
}

/// Reads one page of an ordered remote collection.
#[allow(async_fn_in_trait)]
pub trait PageFetcher<T> {
    async fn fetch(&self, query: &ListQuery, skip: u64, limit: u64) -> Result<Page<T>>;
}

impl<T, X> PageFetcher<T> for X
where
    T: DeserializeOwned,
    X: Transport,
{
    async fn fetch(&self, query: &ListQuery, skip: u64, limit: u64) -> Result<Page<T>> {
        if limit == 0 {
            return Err(FeedError::InvalidRange { skip, limit });
        }
        let response: ListResponse<T> = self.get(&query.page_path(skip, limit)).await?;
        Ok(Page {
            items: response.data,
            skip,
            limit,
            total: response.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Item, MockTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_builds_window_and_reads_count() {
        let transport = MockTransport::new();
        transport.respond(json!({
            "data": [{"id": 3, "body": "c"}, {"id": 4, "body": "d"}],
            "skip": 2,
            "limit": 2,
            "count": 5
        }));

        let query = ListQuery::new("/items").with_filter("flavor", "new");
        let page: Page<Item> = transport.fetch(&query, 2, 2).await.unwrap();

        assert_eq!(page.skip, 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(
            transport.requests(),
            vec![(Method::Get, "/items?keyword=&skip=2&limit=2&flavor=new".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn test_zero_limit_is_rejected_without_io() {
        let transport = MockTransport::new();
        let result: Result<Page<Item>> = transport.fetch(&ListQuery::new("/items"), 0, 0).await;
        assert_eq!(result, Err(FeedError::InvalidRange { skip: 0, limit: 0 }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_passes_through() {
        let transport = MockTransport::new();
        transport.fail(FeedError::RequestRejected {
            status: 503,
            message: None,
        });
        let result: Result<Page<Item>> = transport.fetch(&ListQuery::new("/items"), 0, 10).await;
        assert_eq!(result.unwrap_err().status(), Some(503));
    }

    #[tokio::test]
    async fn test_send_requires_data() {
        let transport = MockTransport::new();
        transport.respond(json!({}));
        let result: Result<Item> = transport.send::<(), _>(Method::Post, "/items", None).await;
        assert!(matches!(result, Err(FeedError::Decode(_))));
    }
}
