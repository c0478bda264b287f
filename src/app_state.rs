use crate::controller::TaskListController;
use actix::Addr;

#[derive(Clone)]
pub struct AppState {
    pub controller: Addr<TaskListController>,
}
