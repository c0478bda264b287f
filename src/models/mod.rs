mod task;

pub use task::{
    Assignee, PageInfo, ProjectRef, Tag, Task, TaskListResult, TaskPriority, TaskStatus,
    UnknownVariant,
};
