//! List Page Component
//!
//! Generic table page over a `ListView`: search box, filter select, inline
//! edit/add rows, a read-only detail panel, delete confirmation, pagination
//! and notifications.
//!
//! The view's observer bumps a version signal; everything rendered here is
//! derived from `ListView::state()` through memos so that typing into a
//! draft input only re-renders that input's value, not the table.

use std::collections::BTreeSet;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use list_view::{
    Draft, EditConflictPolicy, EditTarget, FieldKind, FieldSpec, FieldValue, ListView, ListViewResult,
    ListViewState, Record, RecordDetail, RecordId, RecordSchema, RelatedOptions, ValidationErrors, FORM_ERROR_KEY,
};

use super::{DeleteConfirmButton, NotificationBar};

const AUTO_DISMISS: Duration = Duration::from_secs(4);

type SharedView = StoredValue<Rc<ListView>, LocalStorage>;

/// Rows plus the row-level state that changes their shape
type RowsLayout = (Vec<Record>, Option<EditTarget>, Option<RecordId>);

/// Run an async list operation; failures are already surfaced by the view
fn spawn_op<F, Fut>(list: SharedView, op: F)
where
    F: FnOnce(Rc<ListView>) -> Fut + 'static,
    Fut: Future<Output = ListViewResult<()>> + 'static,
{
    let view = list.get_value();
    spawn_local(async move {
        if let Err(err) = op(view).await {
            log::debug!("list operation ended: {}", err);
        }
    });
}

fn run_sync(list: SharedView, op: impl FnOnce(&ListView) -> ListViewResult<()>) {
    if let Err(err) = list.with_value(|view| op(view)) {
        log::debug!("list operation rejected: {}", err);
    }
}

fn range_label(state: &ListViewState) -> String {
    if state.total == 0 {
        return "0 of 0".to_string();
    }
    let start = state.query.page_index * state.query.page_size + 1;
    let end = (start + state.records.len()).saturating_sub(1).max(start);
    format!("{}-{} of {}", start, end.min(state.total), state.total)
}

fn cell_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Flag(true) => "Yes".to_string(),
        FieldValue::Flag(false) => "No".to_string(),
        other => other.display(),
    }
}

/// `owned_schema` describes the records listed in a row's detail panel
/// (e.g. an employee's todos); without it the panel shows only the row.
#[component]
pub fn ListPage(
    title: &'static str,
    view: Rc<ListView>,
    #[prop(optional)] owned_schema: Option<&'static RecordSchema>,
) -> impl IntoView {
    let schema = view.with_controller(|c| c.schema());
    let page_size_options = view.with_controller(|c| c.config().page_size_options.clone());
    let keep_existing = view.with_controller(|c| c.config().edit_conflict_policy == EditConflictPolicy::KeepExisting);

    let (version, set_version) = signal(0u64);
    view.set_observer(move || set_version.update(|v| *v += 1));
    let list: SharedView = StoredValue::new_local(view);

    let state = Memo::new(move |_| {
        version.track();
        list.with_value(|view| view.state())
    });
    let rows = Memo::new(move |_| -> RowsLayout {
        state.with(|s| (s.records.clone(), s.edit.target(), s.pending_delete.clone()))
    });
    let draft = Memo::new(move |_| state.with(|s| s.edit.draft().cloned()));
    let errors = Memo::new(move |_| state.with(|s| s.edit.errors().cloned().unwrap_or_default()));
    let related = Memo::new(move |_| state.with(|s| s.related.clone()));
    let committing = Memo::new(move |_| state.with(|s| s.committing));
    let detail = Memo::new(move |_| state.with(|s| s.detail.clone()));

    // Auto-dismiss each notification once, holding the view rather than
    // this component so the timer survives a page switch.
    Effect::new(move |seen: Option<BTreeSet<u64>>| {
        let mut seen = seen.unwrap_or_default();
        let ids: Vec<u64> = state.with(|s| s.notifications.iter().map(|n| n.id).collect());
        for id in ids {
            if seen.insert(id) {
                let view = list.get_value();
                spawn_local(async move {
                    gloo_timers::future::sleep(AUTO_DISMISS).await;
                    view.dismiss_notification(id);
                });
            }
        }
        seen
    });

    spawn_op(list, |view| async move { view.open().await });

    let column_count = schema.fields.len() + 2;

    view! {
        <section class="list-page">
            <h2>{title}</h2>

            <NotificationBar
                notifications=Signal::derive(move || state.with(|s| s.notifications.clone()))
                on_dismiss=move |id| list.with_value(|view| view.dismiss_notification(id))
            />

            <div class="list-toolbar">
                <input
                    type="search"
                    class="search-input"
                    placeholder="Search..."
                    prop:value=move || state.with(|s| s.pending_search.clone())
                    on:input=move |ev| {
                        let text = event_target_value(&ev);
                        spawn_op(list, move |view| async move { view.search(text).await });
                    }
                />
                <label class="filter-label">
                    "Filter by "
                    <select
                        class="filter-select"
                        on:change=move |ev| {
                            let attr = event_target_value(&ev);
                            spawn_op(list, move |view| async move { view.set_filter_attribute(&attr).await });
                        }
                    >
                        {schema.filter_attributes.iter().map(|attr| view! {
                            <option
                                value=attr.name
                                prop:selected=move || state.with(|s| s.query.filter_attribute == attr.name)
                            >
                                {attr.label}
                            </option>
                        }).collect_view()}
                    </select>
                </label>
                <button
                    class="add-btn"
                    disabled=move || keep_existing && state.with(|s| s.edit.is_open())
                    on:click=move |_| run_sync(list, |view| view.begin_add())
                >
                    "Add " {schema.kind}
                </button>
            </div>

            {move || state.with(|s| s.error_banner.clone()).map(|message| view! {
                <div class="error-banner" role="alert">
                    {message}
                    <button class="retry-btn" on:click=move |_| spawn_op(list, |view| async move { view.refresh().await })>
                        "Retry"
                    </button>
                </div>
            })}

            {move || detail.get().map(|detail| detail_panel(list, schema, owned_schema, detail))}

            <Show when=move || state.with(|s| s.loading)>
                <div class="loading">"Loading..."</div>
            </Show>

            <table class="list-table">
                <thead>
                    <tr>
                        <th>"ID"</th>
                        {schema.fields.iter().map(|spec| view! { <th>{spec.label}</th> }).collect_view()}
                        <th>"Actions"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let (records, target, pending_delete) = rows.get();
                        let adding = target == Some(EditTarget::New);
                        if records.is_empty() && !adding {
                            return view! {
                                <tr><td class="empty" colspan=column_count.to_string()>"No records found"</td></tr>
                            }.into_any();
                        }
                        let add_row = adding.then(|| edit_row(list, schema, "new".to_string(), draft, errors, related, committing));
                        let body = records.into_iter().map(|record| {
                            if target.as_ref() == Some(&EditTarget::Existing(record.id.clone())) {
                                edit_row(list, schema, record.id.to_string(), draft, errors, related, committing)
                            } else {
                                let confirming = pending_delete.as_ref() == Some(&record.id);
                                record_row(list, schema, record, confirming)
                            }
                        }).collect_view();
                        view! { {add_row} {body} }.into_any()
                    }}
                </tbody>
            </table>

            <div class="pagination">
                <label>
                    "Rows per page "
                    <select on:change=move |ev| {
                        let size = event_target_value(&ev).parse::<i64>().unwrap_or(0);
                        spawn_op(list, move |view| async move { view.set_page_size(size).await });
                    }>
                        {page_size_options.into_iter().map(|size| view! {
                            <option
                                value=size.to_string()
                                prop:selected=move || state.with(|s| s.query.page_size == size)
                            >
                                {size}
                            </option>
                        }).collect_view()}
                    </select>
                </label>
                <span class="page-range">{move || state.with(range_label)}</span>
                <button
                    class="page-btn"
                    disabled=move || state.with(|s| s.query.page_index == 0)
                    on:click=move |_| {
                        let index = state.with(|s| s.query.page_index as i64) - 1;
                        spawn_op(list, move |view| async move { view.set_page(index).await });
                    }
                >
                    "‹"
                </button>
                <button
                    class="page-btn"
                    disabled=move || state.with(|s| s.query.page_index + 1 >= s.page_count)
                    on:click=move |_| {
                        let index = state.with(|s| s.query.page_index as i64) + 1;
                        spawn_op(list, move |view| async move { view.set_page(index).await });
                    }
                >
                    "›"
                </button>
            </div>
        </section>
    }
}

fn record_row(list: SharedView, schema: &'static RecordSchema, record: Record, confirming: bool) -> AnyView {
    let id = record.id.clone();
    let cells = schema
        .fields
        .iter()
        .map(|spec| view! { <td>{cell_text(record.field(spec.name))}</td> })
        .collect_view();

    let view_id = id.clone();
    let edit_id = id.clone();
    let request_id = id.clone();
    let delete_id = id.clone();
    view! {
        <tr>
            <td class="id-cell">{id.to_string()}</td>
            {cells}
            <td class="actions">
                <button
                    class="view-btn"
                    on:click=move |_| {
                        let id = view_id.clone();
                        spawn_op(list, move |view| async move { view.view_record(&id).await });
                    }
                >
                    "View"
                </button>
                <button class="edit-btn" on:click=move |_| run_sync(list, |view| view.begin_edit(&edit_id))>
                    "Edit"
                </button>
                <DeleteConfirmButton
                    button_class="delete-btn"
                    confirming=confirming
                    on_request=move |_| list.with_value(|view| view.request_delete(request_id.clone()))
                    on_confirm=move |_| {
                        let id = delete_id.clone();
                        spawn_op(list, move |view| async move { view.delete(&id).await });
                    }
                    on_cancel=move |_| list.with_value(|view| view.cancel_delete())
                />
            </td>
        </tr>
    }
    .into_any()
}

fn detail_panel(
    list: SharedView,
    schema: &'static RecordSchema,
    owned_schema: Option<&'static RecordSchema>,
    detail: RecordDetail,
) -> AnyView {
    let fields = schema
        .fields
        .iter()
        .map(|spec| view! { <dt>{spec.label}</dt> <dd>{cell_text(detail.record.field(spec.name))}</dd> })
        .collect_view();

    let owned = owned_schema.map(|owned| {
        let body = if detail.loading {
            view! { <div class="loading">"Loading..."</div> }.into_any()
        } else if detail.children.is_empty() {
            view! { <p class="empty">"No " {owned.kind} "s assigned"</p> }.into_any()
        } else {
            let rows = detail
                .children
                .iter()
                .map(|child| {
                    let cells = owned
                        .fields
                        .iter()
                        .filter(|spec| !matches!(spec.kind, FieldKind::Reference { .. }))
                        .map(|spec| view! { <td>{cell_text(child.field(spec.name))}</td> })
                        .collect_view();
                    view! { <tr><td class="id-cell">{child.id.to_string()}</td> {cells}</tr> }
                })
                .collect_view();
            view! { <table class="list-table compact"><tbody>{rows}</tbody></table> }.into_any()
        };
        view! { <h4>"Assigned " {owned.kind} "s"</h4> {body} }
    });

    view! {
        <aside class="detail-panel" role="dialog">
            <header>
                <h3>{schema.kind} " " {detail.record.id.to_string()}</h3>
                <button class="cancel-btn" on:click=move |_| list.with_value(|view| view.close_view())>
                    "Close"
                </button>
            </header>
            <dl>{fields}</dl>
            {owned}
        </aside>
    }
    .into_any()
}

fn edit_row(
    list: SharedView,
    schema: &'static RecordSchema,
    id_label: String,
    draft: Memo<Option<Draft>>,
    errors: Memo<ValidationErrors>,
    related: Memo<RelatedOptions>,
    committing: Memo<bool>,
) -> AnyView {
    let cells = schema
        .fields
        .iter()
        .map(|spec| {
            let spec = *spec;
            view! {
                <td>
                    {field_input(list, spec, draft, related)}
                    {move || errors.with(|e| e.get(spec.name).cloned()).map(|message| view! {
                        <div class="field-error">{message}</div>
                    })}
                </td>
            }
        })
        .collect_view();

    view! {
        <tr
            class="edit-row"
            on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                "Enter" if !committing.get_untracked() => spawn_op(list, |view| async move { view.commit().await }),
                "Escape" => list.with_value(|view| view.cancel_edit()),
                _ => {}
            }
        >
            <td class="id-cell">{id_label}</td>
            {cells}
            <td class="actions">
                <button
                    class="save-btn"
                    disabled=move || committing.get()
                    on:click=move |_| spawn_op(list, |view| async move { view.commit().await })
                >
                    {move || if committing.get() { "Saving..." } else { "Save" }}
                </button>
                <button class="cancel-btn" on:click=move |_| list.with_value(|view| view.cancel_edit())>
                    "Cancel"
                </button>
                {move || errors.with(|e| e.get(FORM_ERROR_KEY).cloned()).map(|message| view! {
                    <div class="field-error">{message}</div>
                })}
            </td>
        </tr>
    }
    .into_any()
}

fn field_input(
    list: SharedView,
    spec: FieldSpec,
    draft: Memo<Option<Draft>>,
    related: Memo<RelatedOptions>,
) -> AnyView {
    let current = move || {
        draft.with(|d| d.as_ref().and_then(|d| d.get(spec.name)).map(FieldValue::display).unwrap_or_default())
    };
    let on_input = move |ev: web_sys::Event| {
        let raw = event_target_value(&ev);
        run_sync(list, |view| view.update_draft_input(spec.name, &raw));
    };

    match spec.kind {
        FieldKind::Flag => view! {
            <input
                type="checkbox"
                prop:checked=move || {
                    draft.with(|d| d.as_ref().and_then(|d| d.get(spec.name)).and_then(FieldValue::as_flag).unwrap_or(false))
                }
                on:change=move |ev| {
                    let checked = event_target_checked(&ev);
                    run_sync(list, |view| view.update_draft_field(spec.name, FieldValue::Flag(checked)));
                }
            />
        }
        .into_any(),
        FieldKind::Reference { related: kind } => view! {
            <select on:change=on_input>
                <option value="">"Select " {kind} "..."</option>
                {move || {
                    let selected = current();
                    related
                        .with(|r| r.get(spec.name).cloned().unwrap_or_default())
                        .into_iter()
                        .map(|id| {
                            let id = id.to_string();
                            let is_selected = id == selected;
                            view! { <option value=id.clone() selected=is_selected>{id.clone()}</option> }
                        })
                        .collect_view()
                }}
            </select>
        }
        .into_any(),
        FieldKind::PositiveNumber => view! {
            <input type="number" min="1" placeholder=spec.label prop:value=current on:input=on_input />
        }
        .into_any(),
        FieldKind::RequiredText => view! {
            <input type="text" placeholder=spec.label prop:value=current on:input=on_input />
        }
        .into_any(),
    }
}
