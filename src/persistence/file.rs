use super::PersistenceResult;
use crate::schedule::SchedulePlan;
use std::fs::File;
use std::path::Path;

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &SchedulePlan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, plan)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SchedulePlan> {
    let file = File::open(path)?;
    let plan: SchedulePlan = serde_json::from_reader(file)?;
    super::validate_plan(&plan)?;
    Ok(plan)
}
