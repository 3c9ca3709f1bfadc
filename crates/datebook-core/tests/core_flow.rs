use datebook_core::datastore::DataStore;
use datebook_core::{CalendarDate, Drawer, ExchangeTask, NewTask, TaskStore};
use datebook_shared::{DrawerEvent, TaskCreate, TaskIdArg};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    CalendarDate::from_ymd(y, m, d).expect("valid date")
}

#[test]
fn datastore_roundtrip_keeps_ids_and_flags() {
    let temp = tempdir().expect("tempdir");
    let data = DataStore::open(temp.path()).expect("open datastore");

    let mut store = TaskStore::new();
    let bills = store
        .add(NewTask::new("Pay bills", "", date(2025, 1, 1)))
        .expect("add task");
    store
        .add(NewTask::new("Dentist", "10:30", date(2025, 1, 3)))
        .expect("add task");
    store.toggle_complete(bills.id);
    data.save(&store).expect("save");

    let mut reloaded = data.load().expect("load");
    assert_eq!(reloaded.export_tasks(), store.export_tasks());

    let next = reloaded
        .add(NewTask::new("Later", "", date(2025, 1, 4)))
        .expect("add after reload");
    assert!(store.iter().all(|t| t.id != next.id));
}

#[test]
fn import_from_json_is_best_effort() {
    let payload = r#"[
        {"title": "broken", "description": "", "date": "not-a-date", "isCompleted": false},
        {"title": "fine", "description": "", "date": "2025-02-02", "isCompleted": false}
    ]"#;
    let records: Vec<ExchangeTask> = serde_json::from_str(payload).expect("parse payload");

    let mut store = TaskStore::new();
    let report = store.import_tasks(records);

    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 1);
    let only: Vec<_> = store.iter().collect();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].date, date(2025, 2, 2));
}

#[test]
fn drawer_session_persists_through_datastore() {
    let temp = tempdir().expect("tempdir");
    let data = DataStore::open(temp.path()).expect("open datastore");
    let mut store = data.load().expect("load");
    let mut drawer = Drawer::open_on(date(2025, 1, 1));

    drawer
        .handle(
            &mut store,
            DrawerEvent::AddTask(TaskCreate {
                title: "Pay bills".to_string(),
                description: String::new(),
                date: Some("2025-01-01".to_string()),
            }),
        )
        .expect("add-task");
    let id = drawer.view(&store).tasks[0].id;
    drawer
        .handle(&mut store, DrawerEvent::ToggleComplete(TaskIdArg { id }))
        .expect("toggle-complete");
    drawer.handle(&mut store, DrawerEvent::Close).expect("close");
    data.save(&store).expect("save");

    let reloaded = data.load().expect("reload");
    let on_day = reloaded.tasks_on_date(date(2025, 1, 1));
    assert_eq!(on_day.len(), 1);
    assert!(on_day[0].is_completed);
    assert_eq!(on_day[0].title, "Pay bills");
}
