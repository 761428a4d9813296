//! The `(resource, operation)` selector.

use std::fmt;
use std::str::FromStr;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    VideoPost,
    PhotoPost,
    UserProfile,
    PostStatus,
    Search,
    Comment,
    Follower,
    Relationship,
}

impl Resource {
    /// Human-readable name used as the prefix of validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Resource::VideoPost => "Video Post",
            Resource::PhotoPost => "Photo Post",
            Resource::UserProfile => "User Profile",
            Resource::PostStatus => "Post Status",
            Resource::Search => "Search",
            Resource::Comment => "Comment",
            Resource::Follower => "Follower",
            Resource::Relationship => "Relationship",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Resource::VideoPost => "videoPost",
            Resource::PhotoPost => "photoPost",
            Resource::UserProfile => "userProfile",
            Resource::PostStatus => "postStatus",
            Resource::Search => "search",
            Resource::Comment => "comment",
            Resource::Follower => "follower",
            Resource::Relationship => "relationship",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "videoPost" => Ok(Resource::VideoPost),
            "photoPost" => Ok(Resource::PhotoPost),
            "userProfile" => Ok(Resource::UserProfile),
            "postStatus" => Ok(Resource::PostStatus),
            "search" => Ok(Resource::Search),
            "comment" => Ok(Resource::Comment),
            "follower" => Ok(Resource::Follower),
            "relationship" => Ok(Resource::Relationship),
            other => Err(Error::Configuration(format!("Unknown resource \"{}\"", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Upload,
    Delete,
    Get,
    Analytics,
    Hashtag,
    Sound,
    List,
    Create,
    ListFollowers,
    ListFollowing,
    Follow,
    Unfollow,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Upload => "upload",
            Operation::Delete => "delete",
            Operation::Get => "get",
            Operation::Analytics => "analytics",
            Operation::Hashtag => "hashtag",
            Operation::Sound => "sound",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::ListFollowers => "listFollowers",
            Operation::ListFollowing => "listFollowing",
            Operation::Follow => "follow",
            Operation::Unfollow => "unfollow",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(Operation::Upload),
            "delete" => Ok(Operation::Delete),
            "get" => Ok(Operation::Get),
            "analytics" => Ok(Operation::Analytics),
            "hashtag" => Ok(Operation::Hashtag),
            "sound" => Ok(Operation::Sound),
            "list" => Ok(Operation::List),
            "create" => Ok(Operation::Create),
            "listFollowers" => Ok(Operation::ListFollowers),
            "listFollowing" => Ok(Operation::ListFollowing),
            "follow" => Ok(Operation::Follow),
            "unfollow" => Ok(Operation::Unfollow),
            other => Err(Error::Configuration(format!("Unknown operation \"{}\"", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let resource: Resource = "userProfile".parse().unwrap();
        let operation: Operation = "listFollowing".parse().unwrap();

        assert_eq!(resource, Resource::UserProfile);
        assert_eq!(resource.to_string(), "userProfile");
        assert_eq!(operation.to_string(), "listFollowing");
        assert!("video".parse::<Resource>().is_err());
    }
}
