//! Domain models with validation at construction
//!
//! All user input is validated before it reaches a store.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod post;
pub mod chat;
pub mod user;

pub use validation::ValidationError;
pub use post::{
    ListingType, Post, PostData, PostDataPatch, PostDetail, PostDetailData, PostDetailPatch,
    PostFilter, PostInput, PostOwner, PostPatch, PostQuery, PostView, PostWithDetail, PropertyKind,
};
pub use chat::{Chat, ChatSummary, ChatWithMessages, Message, MessageText, SeenUpdate};
pub use user::{Profile, ProfilePosts, SaveOutcome};
