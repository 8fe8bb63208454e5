//! Endpoint paths and their query parameter allow-lists
//!
//! Each constructor mirrors one API wrapper: it picks the blog or user
//! variant of the path and the names the endpoint accepts. Parameters
//! outside the allow-list are dropped by the client before signing.

use crate::error::{Result, TumblrError};
use crate::types::Params;

pub const INFO_PARAMS: &[&str] = &[];
pub const LIKES_PARAMS: &[&str] = &["limit", "offset", "before", "after"];
pub const FOLLOWING_PARAMS: &[&str] = &["limit", "offset"];
pub const DASHBOARD_PARAMS: &[&str] = &[
    "limit",
    "offset",
    "type",
    "since_id",
    "reblog_info",
    "notes_info",
];
pub const POSTS_PARAMS: &[&str] = &[
    "id",
    "tag",
    "limit",
    "offset",
    "reblog_info",
    "notes_info",
    "filter",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub allowed: &'static [&'static str],
}

impl Endpoint {
    fn blog_or_user(blog: &str, section: &str, allowed: &'static [&'static str]) -> Self {
        let path = if blog.is_empty() {
            format!("/v2/user/{section}")
        } else {
            format!("/v2/blog/{blog}.tumblr.com/{section}")
        };
        Self { path, allowed }
    }

    /// Blog info, or the authenticated user's info when `blog` is empty.
    pub fn info(blog: &str) -> Self {
        Self::blog_or_user(blog, "info", INFO_PARAMS)
    }

    pub fn likes(blog: &str) -> Self {
        Self::blog_or_user(blog, "likes", LIKES_PARAMS)
    }

    pub fn following(blog: &str) -> Self {
        Self::blog_or_user(blog, "following", FOLLOWING_PARAMS)
    }

    pub fn dashboard() -> Self {
        Self {
            path: "/v2/user/dashboard".to_string(),
            allowed: DASHBOARD_PARAMS,
        }
    }

    /// Posts of a blog, optionally narrowed to one post type.
    pub fn posts(blog: &str, post_type: &str) -> Result<Self> {
        if blog.is_empty() {
            return Err(TumblrError::InvalidArgument(
                "posts requires a blog name".to_string(),
            ));
        }
        Ok(Self {
            path: format!("/v2/blog/{blog}.tumblr.com/posts/{post_type}"),
            allowed: POSTS_PARAMS,
        })
    }
}

/// Options accepted by the likes endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikesOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub before: Option<u64>,
    pub after: Option<u64>,
}

impl From<&LikesOptions> for Params {
    fn from(opts: &LikesOptions) -> Self {
        let mut params = Params::new();
        params.insert_opt("limit", opts.limit);
        params.insert_opt("offset", opts.offset);
        params.insert_opt("before", opts.before);
        params.insert_opt("after", opts.after);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowingOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<&FollowingOptions> for Params {
    fn from(opts: &FollowingOptions) -> Self {
        let mut params = Params::new();
        params.insert_opt("limit", opts.limit);
        params.insert_opt("offset", opts.offset);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Sent as `type`
    pub post_type: Option<String>,
    pub since_id: Option<u64>,
    pub reblog_info: Option<bool>,
    pub notes_info: Option<bool>,
}

impl From<&DashboardOptions> for Params {
    fn from(opts: &DashboardOptions) -> Self {
        let mut params = Params::new();
        params.insert_opt("limit", opts.limit);
        params.insert_opt("offset", opts.offset);
        params.insert_opt("type", opts.post_type.as_deref());
        params.insert_opt("since_id", opts.since_id);
        params.insert_opt("reblog_info", opts.reblog_info);
        params.insert_opt("notes_info", opts.notes_info);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsOptions {
    pub id: Option<u64>,
    pub tag: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub reblog_info: Option<bool>,
    pub notes_info: Option<bool>,
    pub filter: Option<String>,
}

impl From<&PostsOptions> for Params {
    fn from(opts: &PostsOptions) -> Self {
        let mut params = Params::new();
        params.insert_opt("id", opts.id);
        params.insert_opt("tag", opts.tag.as_deref());
        params.insert_opt("limit", opts.limit);
        params.insert_opt("offset", opts.offset);
        params.insert_opt("reblog_info", opts.reblog_info);
        params.insert_opt("notes_info", opts.notes_info);
        params.insert_opt("filter", opts.filter.as_deref());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_paths() {
        assert_eq!(Endpoint::info("").path, "/v2/user/info");
        assert_eq!(Endpoint::info("abc").path, "/v2/blog/abc.tumblr.com/info");
        assert!(Endpoint::info("abc").allowed.is_empty());
    }

    #[test]
    fn test_likes_and_following_paths() {
        assert_eq!(Endpoint::likes("").path, "/v2/user/likes");
        assert_eq!(Endpoint::likes("x").path, "/v2/blog/x.tumblr.com/likes");
        assert_eq!(Endpoint::following("").path, "/v2/user/following");
        assert_eq!(
            Endpoint::following("x").path,
            "/v2/blog/x.tumblr.com/following"
        );
        assert_eq!(Endpoint::following("x").allowed, &["limit", "offset"]);
    }

    #[test]
    fn test_dashboard_has_no_blog_variant() {
        let endpoint = Endpoint::dashboard();
        assert_eq!(endpoint.path, "/v2/user/dashboard");
        assert!(endpoint.allowed.contains(&"since_id"));
    }

    #[test]
    fn test_posts_requires_blog() {
        assert!(matches!(
            Endpoint::posts("", "photo"),
            Err(TumblrError::InvalidArgument(_))
        ));
        assert_eq!(
            Endpoint::posts("staff", "photo").unwrap().path,
            "/v2/blog/staff.tumblr.com/posts/photo"
        );
        assert_eq!(
            Endpoint::posts("staff", "").unwrap().path,
            "/v2/blog/staff.tumblr.com/posts/"
        );
    }

    #[test]
    fn test_dashboard_options_use_type_name() {
        let opts = DashboardOptions {
            post_type: Some("photo".to_string()),
            reblog_info: Some(true),
            ..Default::default()
        };
        let params = Params::from(&opts);
        assert_eq!(params.get("type"), Some("photo"));
        assert_eq!(params.get("reblog_info"), Some("true"));
        assert_eq!(params.get("limit"), None);
    }

    #[test]
    fn test_option_records_stay_within_allow_lists() {
        let likes = Params::from(&LikesOptions {
            limit: Some(1),
            offset: Some(2),
            before: Some(3),
            after: Some(4),
        });
        assert_eq!(likes.filtered(LIKES_PARAMS), likes);

        let posts = Params::from(&PostsOptions {
            id: Some(1),
            tag: Some("t".to_string()),
            limit: Some(1),
            offset: Some(1),
            reblog_info: Some(false),
            notes_info: Some(false),
            filter: Some("text".to_string()),
        });
        assert_eq!(posts.filtered(POSTS_PARAMS), posts);
    }
}
