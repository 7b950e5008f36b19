//! Canonical column names shared across layers
//!
//! These names are the wire contract between the event source, the per-entity
//! records provider, and the chain builder. Filters and joins match on exact
//! string equality, so every layer must use these constants rather than
//! inline literals.

/// Handle of the callback object that executed
pub const CALLBACK_OBJECT: &str = "callback_object";
/// Callback execution start, nanoseconds
pub const CALLBACK_START_TIMESTAMP: &str = "callback_start_timestamp";
/// Callback execution end, nanoseconds
pub const CALLBACK_END_TIMESTAMP: &str = "callback_end_timestamp";
/// Handle of the publisher that emitted the message
pub const PUBLISHER_HANDLE: &str = "publisher_handle";
/// Client-library publish timestamp, delivery mechanism unspecified
pub const RCLCPP_PUBLISH_TIMESTAMP: &str = "rclcpp_publish_timestamp";
/// Client-library publish timestamp, inter-process delivery
pub const RCLCPP_INTER_PUBLISH_TIMESTAMP: &str = "rclcpp_inter_publish_timestamp";
/// Client-library publish timestamp, intra-process delivery
pub const RCLCPP_INTRA_PUBLISH_TIMESTAMP: &str = "rclcpp_intra_publish_timestamp";
/// Middleware-core publish timestamp
pub const RCL_PUBLISH_TIMESTAMP: &str = "rcl_publish_timestamp";
/// Middleware write timestamp
pub const DDS_WRITE_TIMESTAMP: &str = "dds_write_timestamp";
/// Per-message stamp carried unchanged along the path
pub const MESSAGE_TIMESTAMP: &str = "message_timestamp";
/// Middleware source timestamp
pub const SOURCE_TIMESTAMP: &str = "source_timestamp";
/// Handle of the writing callback in a variable-passing record
pub const CALLBACK_OBJECT_WRITE: &str = "callback_object_write";
/// Handle of the reading callback in a variable-passing record
pub const CALLBACK_OBJECT_READ: &str = "callback_object_read";
