use failover_exec::operations::assignments::{unassign_technician, UNASSIGN_TECHNICIAN};

use crate::exit_codes;
use crate::{EventsArgs, OutputArgs, RetryArgs, SessionArgs};

use super::config::prepare_run;
use super::run::report;

pub async fn unassign_cmd(
    technician: &str,
    location: &str,
    output: OutputArgs,
    session: SessionArgs,
    retry: RetryArgs,
    events: EventsArgs,
) -> i32 {
    let Some(ctx) = prepare_run(UNASSIGN_TECHNICIAN, &session, &retry, &events, &output) else {
        return exit_codes::RUNTIME_ERROR;
    };

    let result = unassign_technician(&ctx.runner, &ctx.session, technician, location).await;
    report(result, ctx.metrics, &output).await
}
