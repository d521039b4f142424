use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{EffectiveConfig, ResultBuilder, print_result};

pub fn execute(ctx: &CommandContext) -> Result<()> {
	let settings = ctx.settings()?;
	let effective = settings.effective();

	let result = ResultBuilder::<EffectiveConfig>::new("config").data(effective).build();
	print_result(&result, ctx.format());
	Ok(())
}
