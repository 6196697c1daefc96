// fst_workflow/src/workflow/archive.rs

//! Administrative archival of confirmed orders.
//!
//! Revenue is a live sum over `confirmed` orders; moving them to `archived`
//! zeroes the counter without deleting history.

use crate::error::WorkflowError;
use crate::model::{OrderAction, OrderPatch, Transition};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, Workflows};
use crate::store::UpdateGuard;
use crate::workflow::common_steps::{authorize_operator_step, bounded, explain_unmatched_write};
use crate::workflow::contexts::{ArchiveOrderCtxData, BulkArchiveCtxData};
use tracing::info;

pub fn register_archive_order_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<ArchiveOrderCtxData>::new(
    "archive_order",
    &[("authorize_operator", false), ("archive_order", false)],
  );

  p.on_root("authorize_operator", authorize_operator_step::<ArchiveOrderCtxData>);

  p.on_root("archive_order", |ctx_data: ContextData<ArchiveOrderCtxData>| async move {
    let (services, order_id) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.order_id)
    };

    let guard = UpdateGuard::payment_is(Transition::Archive.from_status());
    let patch = OrderPatch {
      payment_status: Some(Transition::Archive.to_status()),
      ..OrderPatch::touched_at(services.clock.now())
    };

    match bounded(&services, "archive_order", services.store.update_where(order_id, &guard, &patch)).await? {
      Some(order) => {
        info!(%order_id, "Order archived.");
        ctx_data.write().archived_order = Some(order);
        Ok::<_, WorkflowError>(PipelineControl::Continue)
      }
      None => Err(explain_unmatched_write(&services, order_id, OrderAction::Payment(Transition::Archive), None).await),
    }
  });

  workflows.register_pipeline(p);
}

pub fn register_bulk_archive_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<BulkArchiveCtxData>::new(
    "bulk_archive",
    &[("authorize_operator", false), ("archive_matching", false)],
  );

  p.on_root("authorize_operator", authorize_operator_step::<BulkArchiveCtxData>);

  p.on_root("archive_matching", |ctx_data: ContextData<BulkArchiveCtxData>| async move {
    let (services, filter) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.filter.clone())
    };

    let now = services.clock.now();
    let count = bounded(&services, "archive_confirmed", services.store.archive_confirmed(&filter, now)).await?;
    info!(count, ?filter, "Confirmed orders archived.");
    ctx_data.write().archived_count = count;
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(p);
}
