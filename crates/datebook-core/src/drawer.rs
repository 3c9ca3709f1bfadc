//! Boundary between the day drawer and the task store.
//!
//! The drawer owns only its open/closed flag and the selected date. Every
//! change to tasks goes through [`TaskStore`] operations; the store is passed
//! in by the caller that owns it.

use datebook_shared::{DrawerEvent, DrawerView, TaskCreate, TaskUpdateArgs};
use tracing::{debug, instrument};

use crate::date::CalendarDate;
use crate::error::StoreError;
use crate::store::TaskStore;
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawer {
    open: bool,
    selected_date: CalendarDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawerOutcome {
    Added(Task),
    Removed(Option<Task>),
    Toggled(Option<bool>),
    Updated(bool),
    Closed,
}

impl Drawer {
    pub fn open_on(date: CalendarDate) -> Self {
        Self {
            open: true,
            selected_date: date,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected_date(&self) -> CalendarDate {
        self.selected_date
    }

    pub fn select(&mut self, date: CalendarDate) {
        self.selected_date = date;
        self.open = true;
    }

    #[instrument(skip(self, store))]
    pub fn handle(
        &mut self,
        store: &mut TaskStore,
        event: DrawerEvent,
    ) -> Result<DrawerOutcome, StoreError> {
        match event {
            DrawerEvent::AddTask(create) => {
                let new = new_task_from(create)?;
                store.add(new).map(DrawerOutcome::Added)
            }
            DrawerEvent::RemoveTask(arg) => Ok(DrawerOutcome::Removed(store.remove(TaskId(arg.id)))),
            DrawerEvent::ToggleComplete(arg) => {
                Ok(DrawerOutcome::Toggled(store.toggle_complete(TaskId(arg.id))))
            }
            DrawerEvent::UpdateTask(args) => store.update(task_update_from(args)).map(DrawerOutcome::Updated),
            DrawerEvent::Close => {
                debug!("drawer closed");
                self.open = false;
                Ok(DrawerOutcome::Closed)
            }
        }
    }

    pub fn view(&self, store: &TaskStore) -> DrawerView {
        DrawerView {
            selected_date: self.selected_date.to_string(),
            open: self.open,
            tasks: store
                .tasks_on_date(self.selected_date)
                .into_iter()
                .map(Task::to_dto)
                .collect(),
        }
    }
}

fn new_task_from(create: TaskCreate) -> Result<NewTask, StoreError> {
    let date = create.date.as_deref().map(CalendarDate::parse).transpose()?;
    Ok(NewTask {
        title: create.title,
        description: create.description,
        date,
    })
}

fn task_update_from(args: TaskUpdateArgs) -> TaskUpdate {
    TaskUpdate {
        id: TaskId(args.id),
        title: args.title,
        description: args.description,
    }
}

#[cfg(test)]
mod tests {
    use datebook_shared::TaskIdArg;

    use super::*;

    fn day() -> CalendarDate {
        CalendarDate::from_ymd(2025, 1, 1).expect("valid date")
    }

    fn add_event(title: &str, date: Option<&str>) -> DrawerEvent {
        DrawerEvent::AddTask(TaskCreate {
            title: title.to_string(),
            description: String::new(),
            date: date.map(str::to_string),
        })
    }

    #[test]
    fn events_flow_through_to_the_store() {
        let mut store = TaskStore::new();
        let mut drawer = Drawer::open_on(day());

        let DrawerOutcome::Added(task) = drawer
            .handle(&mut store, add_event("Pay bills", Some("2025-01-01")))
            .expect("add-task")
        else {
            panic!("expected Added");
        };

        drawer
            .handle(&mut store, DrawerEvent::ToggleComplete(TaskIdArg { id: task.id.0 }))
            .expect("toggle-complete");
        drawer
            .handle(
                &mut store,
                DrawerEvent::UpdateTask(TaskUpdateArgs {
                    id: task.id.0,
                    title: "Pay all bills".to_string(),
                    description: "electric, water".to_string(),
                }),
            )
            .expect("update-task");

        let view = drawer.view(&store);
        assert_eq!(view.selected_date, "2025-01-01");
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.tasks[0].title, "Pay all bills");
        assert!(view.tasks[0].is_completed);

        drawer
            .handle(&mut store, DrawerEvent::RemoveTask(TaskIdArg { id: task.id.0 }))
            .expect("remove-task");
        assert!(drawer.view(&store).tasks.is_empty());
    }

    #[test]
    fn malformed_or_missing_date_is_invalid_input() {
        let mut store = TaskStore::new();
        let mut drawer = Drawer::open_on(day());

        let bad = drawer.handle(&mut store, add_event("x", Some("01/01/2025")));
        assert!(matches!(bad, Err(StoreError::InvalidInput(_))));
        let missing = drawer.handle(&mut store, add_event("x", None));
        assert!(matches!(missing, Err(StoreError::InvalidInput(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn selecting_a_date_reopens_and_refilters() {
        let mut store = TaskStore::new();
        let mut drawer = Drawer::open_on(day());
        drawer
            .handle(&mut store, add_event("new year", Some("2025-01-01")))
            .expect("add-task");
        drawer
            .handle(&mut store, add_event("next day", Some("2025-01-02")))
            .expect("add-task");
        drawer.handle(&mut store, DrawerEvent::Close).expect("close");

        let next = CalendarDate::from_ymd(2025, 1, 2).expect("valid date");
        drawer.select(next);
        assert!(drawer.is_open());
        assert_eq!(drawer.selected_date(), next);

        let view = drawer.view(&store);
        assert!(view.open);
        assert_eq!(view.selected_date, "2025-01-02");
        let titles: Vec<&str> = view.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["next day"]);
    }

    #[test]
    fn close_leaves_store_untouched() {
        let mut store = TaskStore::new();
        let mut drawer = Drawer::open_on(day());
        drawer
            .handle(&mut store, add_event("keep", Some("2025-01-01")))
            .expect("add-task");
        let before = store.export_tasks();

        let outcome = drawer.handle(&mut store, DrawerEvent::Close).expect("close");
        assert_eq!(outcome, DrawerOutcome::Closed);
        assert!(!drawer.is_open());
        assert_eq!(store.export_tasks(), before);
    }
}
