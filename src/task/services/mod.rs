//! Application services for task lifecycle orchestration.

mod allocator;
mod error;
mod lifecycle;
mod notification;
mod payload;
mod permissions;

pub use allocator::allocate_running_number;
pub use error::{LifecycleErrorKind, LifecycleResult, TaskLifecycleError};
pub use lifecycle::{
    CreateTaskRequest, Credentials, ListTasksRequest, PromoteTaskRequest, PromotedTask,
    TaskLifecycleService,
};
pub use notification::{
    DeliveryReport, NotificationDispatcher, NotificationHandle, NotificationSettings,
    TaskDoneNotice,
};
pub use permissions::{PermissionResolver, authorize_in};
