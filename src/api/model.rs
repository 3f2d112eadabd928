//! Typed shapes for upstream JSON payloads.
//!
//! Reddit wraps most records in a `{kind, data}` "thing" and most collections
//! in a listing. Fields are defaulted so partial or `null`-laden records still
//! decode; presentation decides what a missing value looks like.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Record type carried by a thing, from its `kind` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThingKind {
    /// `t1`
    Comment,
    /// `t2`
    Account,
    /// `t3`
    Link,
    /// `t4`
    Message,
    /// `t5`
    Subreddit,
    /// `more`: a "load more comments" placeholder.
    More,
    /// Anything else.
    Other(String),
}

impl ThingKind {
    /// Classifies a raw `kind` tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "t1" => Self::Comment,
            "t2" => Self::Account,
            "t3" => Self::Link,
            "t4" => Self::Message,
            "t5" => Self::Subreddit,
            "more" => Self::More,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A `{kind, data}` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing<T> {
    /// Raw kind tag, e.g. `t3`.
    #[serde(default)]
    pub kind: String,
    /// The record itself.
    pub data: T,
}

impl<T> Thing<T> {
    /// Parsed kind tag.
    #[must_use]
    pub fn kind(&self) -> ThingKind {
        ThingKind::from_tag(&self.kind)
    }
}

/// A paginated collection of things.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    /// Listing body.
    #[serde(default)]
    pub data: ListingData<T>,
}

/// Children and pagination cursors of a [`Listing`].
#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    /// Records in upstream order.
    #[serde(default)]
    pub children: Vec<Thing<T>>,
    /// Cursor for the next page.
    #[serde(default)]
    pub after: Option<String>,
    /// Cursor for the previous page.
    #[serde(default)]
    pub before: Option<String>,
}

impl<T> Default for ListingData<T> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            after: None,
            before: None,
        }
    }
}

impl<T> Listing<T> {
    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.children.len()
    }

    /// Whether the listing has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.children.is_empty()
    }

    /// Unwraps every child record, keeping order.
    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        self.data.children.into_iter().map(|thing| thing.data).collect()
    }
}

/// A submission (`t3`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub subreddit: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    /// `None` when the account was deleted.
    pub author: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub score: i64,
    #[serde(deserialize_with = "nullable")]
    pub upvote_ratio: f64,
    #[serde(deserialize_with = "nullable")]
    pub num_comments: u64,
    pub created_utc: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub permalink: String,
    #[serde(deserialize_with = "nullable")]
    pub selftext: String,
    /// Link target; for self posts this points back at the post itself.
    pub url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub is_self: bool,
    pub link_flair_text: Option<String>,
}

/// A comment (`t1`). Mentions in the inbox share this shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Comment {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub author: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub score: i64,
    pub created_utc: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub body: String,
    #[serde(deserialize_with = "nullable")]
    pub parent_id: String,
    #[serde(deserialize_with = "nullable")]
    pub is_submitter: bool,
    #[serde(deserialize_with = "nullable")]
    pub subreddit: String,
    #[serde(deserialize_with = "nullable")]
    pub permalink: String,
}

/// An account (`t2`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Account {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub comment_karma: i64,
    #[serde(deserialize_with = "nullable")]
    pub link_karma: i64,
    #[serde(deserialize_with = "nullable")]
    pub is_mod: bool,
    pub created_utc: Option<f64>,
}

/// A record that may or may not come wrapped in `{data: ...}`.
///
/// The identity endpoint returns a thing when logged in and a bare (often
/// empty) object otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaybeWrapped<T> {
    /// `{"kind": ..., "data": {...}}`
    Wrapped {
        /// The record.
        data: T,
    },
    /// The record itself.
    Bare(T),
}

impl<T> MaybeWrapped<T> {
    /// Returns the record regardless of wrapping.
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// A post together with its top-level replies.
#[derive(Debug, Clone, Default)]
pub struct PostWithComments {
    /// The post, when the response carried one.
    pub post: Option<Post>,
    /// Comment records in upstream order; "load more" placeholders dropped.
    pub comments: Vec<Comment>,
}

impl PostWithComments {
    /// Interprets the two-element `[post listing, comment listing]` response.
    ///
    /// A response of any other shape yields no post and no comments.
    ///
    /// # Errors
    ///
    /// Returns a decode error when an element that is present has the wrong
    /// shape.
    pub fn from_response(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Array(elements) = value else {
            return Ok(Self::default());
        };
        let mut elements = elements.into_iter();

        let post = match elements.next() {
            Some(first) => serde_json::from_value::<Listing<Post>>(first)?
                .data
                .children
                .into_iter()
                .next()
                .map(|thing| thing.data),
            None => None,
        };

        let comments = match elements.next() {
            Some(second) => serde_json::from_value::<Listing<Value>>(second)?
                .data
                .children
                .into_iter()
                .filter(|thing| thing.kind() == ThingKind::Comment)
                .map(|thing| serde_json::from_value::<Comment>(thing.data))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self { post, comments })
    }
}

/// Envelope returned by mutating endpoints (`api_type=json`).
///
/// A non-empty error list is an application-level rejection even on HTTP 200;
/// it is data, not a failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationEnvelope {
    /// Envelope body.
    #[serde(default)]
    pub json: MutationBody,
}

/// Body of a [`MutationEnvelope`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MutationBody {
    /// Raw error entries, usually `[code, message, field]` triples.
    #[serde(deserialize_with = "nullable")]
    pub errors: Vec<Value>,
    /// Result payload, when the mutation succeeded.
    pub data: Option<MutationData>,
}

/// Result payload of a mutation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MutationData {
    /// Created records (replies).
    #[serde(deserialize_with = "nullable")]
    pub things: Vec<Thing<Comment>>,
    /// Created post URL (submissions).
    pub url: Option<String>,
    /// Created post id (submissions).
    pub id: Option<String>,
    /// Created post fullname (submissions).
    pub name: Option<String>,
}

impl MutationEnvelope {
    /// Whether upstream rejected the mutation.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        !self.json.errors.is_empty()
    }

    /// Human-readable error entries.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.json.errors.iter().map(describe_error).collect()
    }

    /// The first created record, for replies.
    #[must_use]
    pub fn created_comment(&self) -> Option<&Comment> {
        self.json
            .data
            .as_ref()
            .and_then(|data| data.things.first())
            .map(|thing| &thing.data)
    }

    /// Result payload, if any.
    #[must_use]
    pub fn data(&self) -> Option<&MutationData> {
        self.json.data.as_ref()
    }
}

fn describe_error(entry: &Value) -> String {
    match entry {
        Value::String(message) => message.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(text) if !text.is_empty() => Some(text.clone()),
                Value::Null | Value::String(_) => None,
                other => Some(other.to_string()),
            })
            .collect::<Vec<_>>()
            .join(": "),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_post_tolerates_nulls_and_missing_fields() {
        let post: Post = serde_json::from_value(json!({
            "id": "abc",
            "title": null,
            "author": null,
            "score": 12,
            "link_flair_text": null
        }))
        .unwrap();
        assert_eq!(post.id, "abc");
        assert_eq!(post.title, "");
        assert_eq!(post.author, None);
        assert_eq!(post.score, 12);
        assert_eq!(post.num_comments, 0);
        assert!(!post.is_self);
    }

    #[test]
    fn test_listing_into_records_keeps_order() {
        let listing: Listing<Post> = serde_json::from_value(json!({
            "kind": "Listing",
            "data": {
                "after": "t3_b",
                "children": [
                    {"kind": "t3", "data": {"id": "a"}},
                    {"kind": "t3", "data": {"id": "b"}}
                ]
            }
        }))
        .unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing.data.after.as_deref(), Some("t3_b"));
        let ids: Vec<_> = listing.into_records().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_post_with_comments_drops_more_placeholders() {
        let response = json!([
            {"kind": "Listing", "data": {"children": [
                {"kind": "t3", "data": {"id": "p1", "title": "Hello"}}
            ]}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {"id": "c1", "body": "first"}},
                {"kind": "more", "data": {"count": 4, "children": ["x", "y"]}},
                {"kind": "t1", "data": {"id": "c2", "body": "second"}}
            ]}}
        ]);

        let parsed = PostWithComments::from_response(response).unwrap();

        assert_eq!(parsed.post.unwrap().title, "Hello");
        let ids: Vec<_> = parsed.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn test_post_with_comments_non_array_is_empty() {
        let parsed = PostWithComments::from_response(json!({"error": 404})).unwrap();
        assert!(parsed.post.is_none());
        assert!(parsed.comments.is_empty());
    }

    #[test]
    fn test_post_with_comments_single_element() {
        let parsed = PostWithComments::from_response(json!([
            {"data": {"children": []}}
        ]))
        .unwrap();
        assert!(parsed.post.is_none());
        assert!(parsed.comments.is_empty());
    }

    #[test]
    fn test_maybe_wrapped_accepts_both_shapes() {
        let wrapped: MaybeWrapped<Account> =
            serde_json::from_value(json!({"kind": "t2", "data": {"name": "alice"}})).unwrap();
        assert_eq!(wrapped.into_inner().name, "alice");

        let bare: MaybeWrapped<Account> = serde_json::from_value(json!({"name": "bob"})).unwrap();
        assert_eq!(bare.into_inner().name, "bob");

        let empty: MaybeWrapped<Account> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.into_inner().name, "");
    }

    #[test]
    fn test_mutation_envelope_errors_are_data() {
        let envelope: MutationEnvelope = serde_json::from_value(json!({
            "json": {"errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]]}
        }))
        .unwrap();
        assert!(envelope.is_rejected());
        assert_eq!(
            envelope.error_messages(),
            vec!["RATELIMIT: you are doing that too much: ratelimit"]
        );
        assert!(envelope.created_comment().is_none());
    }

    #[test]
    fn test_mutation_envelope_created_comment() {
        let envelope: MutationEnvelope = serde_json::from_value(json!({
            "json": {"errors": [], "data": {"things": [
                {"kind": "t1", "data": {"id": "k1", "permalink": "/r/x/comments/p/_/k1/"}}
            ]}}
        }))
        .unwrap();
        assert!(!envelope.is_rejected());
        assert_eq!(envelope.created_comment().unwrap().id, "k1");
    }

    #[test]
    fn test_thing_kind_tags() {
        assert_eq!(ThingKind::from_tag("t1"), ThingKind::Comment);
        assert_eq!(ThingKind::from_tag("more"), ThingKind::More);
        assert_eq!(ThingKind::from_tag("zz"), ThingKind::Other("zz".to_string()));
    }
}
