//! Domain operations: one GET or POST each against a fixed path template.

use serde_json::Value;
use tracing::instrument;
use urlencoding::encode;

use super::model::{Account, Comment, Listing, MaybeWrapped, MutationEnvelope, Post, PostWithComments};
use super::options::{ListingOptions, PostContent, SearchOptions, SubredditSort};
use crate::client::constants::IDENTITY_PATH;
use crate::client::{ClientError, SessionClient};

const POST_PREFIX: &str = "t3_";
const COMMENT_PREFIX: &str = "t1_";

/// Normalizes a reply target to a fullname; bare ids are taken as posts.
#[must_use]
pub fn reply_target(thing_id: &str) -> String {
    if thing_id.starts_with(COMMENT_PREFIX) || thing_id.starts_with(POST_PREFIX) {
        thing_id.to_string()
    } else {
        format!("{POST_PREFIX}{thing_id}")
    }
}

/// Percent-encodes a subreddit path segment, keeping `+` so multireddits
/// like `rust+programming` stay combined.
fn subreddit_segment(name: &str) -> String {
    name.split('+').map(encode).collect::<Vec<_>>().join("+")
}

fn bare_id(fullname: &str) -> &str {
    fullname
        .strip_prefix(POST_PREFIX)
        .or_else(|| fullname.strip_prefix(COMMENT_PREFIX))
        .unwrap_or(fullname)
}

impl SessionClient {
    /// Searches posts, across the whole site or within one subreddit.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientError`] from the underlying GET.
    #[instrument(level = "debug", skip(self))]
    pub async fn search(
        &mut self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Listing<Post>, ClientError> {
        let subreddit = options.subreddit.as_deref().unwrap_or("all");
        let restrict = if options.subreddit.is_some() { "on" } else { "off" };
        let params = [
            ("q", query.to_string()),
            ("sort", options.sort.as_str().to_string()),
            ("t", options.time.as_str().to_string()),
            ("limit", options.count.to_string()),
            ("restrict_sr", restrict.to_string()),
            ("type", "link".to_string()),
            ("raw_json", "1".to_string()),
        ];
        let sub = subreddit_segment(subreddit);
        let referer = self.page_url(&format!("/r/{sub}/search/?q={}", encode(query)));
        self.get(&format!("/r/{sub}/search.json"), &params, Some(&referer))
            .await
    }

    /// Lists a subreddit's posts.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientError`] from the underlying GET.
    #[instrument(level = "debug", skip(self))]
    pub async fn subreddit_posts(
        &mut self,
        name: &str,
        options: &ListingOptions,
    ) -> Result<Listing<Post>, ClientError> {
        let mut params = vec![
            ("limit", options.count.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if options.sort == SubredditSort::Top {
            params.push(("t", options.time.as_str().to_string()));
        }
        let sub = subreddit_segment(name);
        let referer = self.page_url(&format!("/r/{sub}/"));
        self.get(
            &format!("/r/{sub}/{}.json", options.sort.as_str()),
            &params,
            Some(&referer),
        )
        .await
    }

    /// Reads one post and its top comments. Accepts ids with or without `t3_`.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientError`] from the underlying GET, or
    /// [`ClientError::Decode`] when a listing element is malformed.
    #[instrument(level = "debug", skip(self))]
    pub async fn read_post(
        &mut self,
        post_id: &str,
        comment_count: u32,
    ) -> Result<PostWithComments, ClientError> {
        let id = encode(post_id.strip_prefix(POST_PREFIX).unwrap_or(post_id)).into_owned();
        let path = format!("/comments/{id}.json");
        let params = [
            ("limit", comment_count.to_string()),
            ("sort", "confidence".to_string()),
            ("raw_json", "1".to_string()),
        ];
        let referer = self.page_url(&format!("/comments/{id}/"));
        let response: Value = self.get(&path, &params, Some(&referer)).await?;
        PostWithComments::from_response(response)
            .map_err(|error| ClientError::decode(self.page_url(&path), error))
    }

    /// Replies to a post (`t3_`) or comment (`t1_`); bare ids are posts.
    ///
    /// Upstream rejections come back inside the envelope, not as errors.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Blocked`] on 403, otherwise propagates
    /// [`ClientError`] from the underlying POST.
    #[instrument(level = "debug", skip(self, text))]
    pub async fn reply(
        &mut self,
        thing_id: &str,
        text: &str,
    ) -> Result<MutationEnvelope, ClientError> {
        let target = reply_target(thing_id);
        let referer = self.page_url(&format!("/comments/{}/", encode(bare_id(&target))));
        let form = vec![
            ("thing_id", target),
            ("text", text.to_string()),
            ("api_type", "json".to_string()),
        ];
        self.post("/api/comment", form, Some(&referer)).await
    }

    /// Creates a link or text post in a subreddit.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Blocked`] on 403, otherwise propagates
    /// [`ClientError`] from the underlying POST.
    #[instrument(level = "debug", skip(self, content))]
    pub async fn submit_post(
        &mut self,
        subreddit: &str,
        title: &str,
        content: &PostContent,
    ) -> Result<MutationEnvelope, ClientError> {
        let mut form = vec![
            ("sr", subreddit.to_string()),
            ("title", title.to_string()),
            ("api_type", "json".to_string()),
            ("resubmit", "true".to_string()),
        ];
        match content {
            PostContent::Link(url) => {
                form.push(("kind", "link".to_string()));
                form.push(("url", url.clone()));
            }
            PostContent::Text(text) => {
                form.push(("kind", "self".to_string()));
                form.push(("text", text.clone()));
            }
        }
        let referer = self.page_url(&format!("/r/{}/submit/", subreddit_segment(subreddit)));
        self.post("/api/submit", form, Some(&referer)).await
    }

    /// The authenticated account. Logged-out sessions yield an empty name.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientError`] from the underlying GET.
    #[instrument(level = "debug", skip(self))]
    pub async fn me(&mut self) -> Result<Account, ClientError> {
        let account: MaybeWrapped<Account> = self.get(IDENTITY_PATH, &[], None).await?;
        Ok(account.into_inner())
    }

    /// Public profile of another account.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientError`] from the underlying GET.
    #[instrument(level = "debug", skip(self))]
    pub async fn user_about(&mut self, username: &str) -> Result<Account, ClientError> {
        let user = encode(username);
        let referer = self.page_url(&format!("/user/{user}/"));
        let account: MaybeWrapped<Account> = self
            .get(&format!("/user/{user}/about.json"), &[], Some(&referer))
            .await?;
        Ok(account.into_inner())
    }

    /// Recent username mentions from the inbox.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientError`] from the underlying GET.
    #[instrument(level = "debug", skip(self))]
    pub async fn mentions(&mut self, count: u32) -> Result<Listing<Comment>, ClientError> {
        let params = [("limit", count.to_string()), ("raw_json", "1".to_string())];
        let referer = self.page_url("/message/mentions/");
        self.get("/message/mentions.json", &params, Some(&referer))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_target_prefixes_bare_ids_as_posts() {
        assert_eq!(reply_target("abc"), "t3_abc");
        assert_eq!(reply_target("t3_abc"), "t3_abc");
        assert_eq!(reply_target("t1_xyz"), "t1_xyz");
    }

    #[test]
    fn test_subreddit_segment_keeps_multireddit_plus() {
        assert_eq!(subreddit_segment("rust"), "rust");
        assert_eq!(subreddit_segment("rust+programming"), "rust+programming");
        assert_eq!(subreddit_segment("a b+c/d"), "a%20b+c%2Fd");
    }

    #[test]
    fn test_bare_id_strips_either_prefix() {
        assert_eq!(bare_id("t3_abc"), "abc");
        assert_eq!(bare_id("t1_xyz"), "xyz");
        assert_eq!(bare_id("plain"), "plain");
    }
}
