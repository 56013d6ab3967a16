use orchard_model::prelude::*;

use crate::api_client::{ApiClient, RequestOptions};
use crate::error::ClientResult;
use crate::routes;

impl ApiClient {
    /// Approved testimonials, newest first
    pub async fn forum_posts(&self, page: Option<u32>) -> ClientResult<Vec<ForumPost>> {
        let mut options = RequestOptions::get();
        if let Some(page) = page {
            options = options.query("page", page);
        }
        self.authenticated_request(routes::forum::POSTS, options)
            .await
    }

    /// Submit a testimonial; it stays pending until moderated
    pub async fn create_forum_post(&self, post: &NewForumPost) -> ClientResult<ForumPost> {
        self.post(routes::forum::POSTS, post).await
    }
}
