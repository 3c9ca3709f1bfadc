use serde::{
  Deserialize,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
  pub id:           u64,
  #[serde(default)]
  pub title:        String,
  #[serde(default)]
  pub description:  String,
  pub date:         String,
  #[serde(default)]
  pub is_completed: bool
}

/// Payload of `add-task`: no id, no
/// completion flag.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskCreate {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub date:        Option<String>
}

/// Payload of `update-task`: no date, no
/// completion flag.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskUpdateArgs {
  pub id:          u64,
  pub title:       String,
  #[serde(default)]
  pub description: String
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskIdArg {
  pub id: u64
}

/// Everything the drawer may ask of the
/// task store. `Close` only touches
/// drawer-local state.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(
  tag = "event",
  rename_all = "kebab-case"
)]
pub enum DrawerEvent {
  AddTask(TaskCreate),
  RemoveTask(TaskIdArg),
  ToggleComplete(TaskIdArg),
  UpdateTask(TaskUpdateArgs),
  Close
}

/// Read-only input for the drawer's
/// presentation.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct DrawerView {
  pub selected_date: String,
  pub open:          bool,
  pub tasks:         Vec<TaskDto>
}

#[cfg(test)]
mod tests {
  use super::{
    DrawerEvent,
    TaskDto,
    TaskIdArg
  };

  #[test]
  fn drawer_events_use_kebab_case_tags()
  {
    let raw = r#"{"event":"toggle-complete","id":7}"#;
    let event: DrawerEvent =
      serde_json::from_str(raw)
        .expect("parse event");
    assert_eq!(
      event,
      DrawerEvent::ToggleComplete(
        TaskIdArg { id: 7 }
      )
    );

    let close: DrawerEvent =
      serde_json::from_str(
        r#"{"event":"close"}"#
      )
      .expect("parse close");
    assert_eq!(close, DrawerEvent::Close);
  }

  #[test]
  fn add_task_date_may_be_missing() {
    let raw = r#"{"event":"add-task","title":"Pay bills"}"#;
    let event: DrawerEvent =
      serde_json::from_str(raw)
        .expect("parse add-task");
    let DrawerEvent::AddTask(create) =
      event
    else {
      panic!("expected add-task");
    };
    assert_eq!(create.title, "Pay bills");
    assert!(create.description.is_empty());
    assert!(create.date.is_none());
  }

  #[test]
  fn task_dto_uses_camel_case_fields() {
    let dto = TaskDto {
      id:           3,
      title:        "Pay bills".to_string(),
      description:  String::new(),
      date:         "2025-01-01".to_string(),
      is_completed: true
    };
    let value = serde_json::to_value(&dto)
      .expect("serialize dto");
    assert_eq!(value["isCompleted"], true);
    assert_eq!(value["date"], "2025-01-01");
  }
}
