use anyhow::{Context, Result};
use okozukai_game::{CampaignPlan, Catalog};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Build a plan from a goal id and recurring item ids.
pub fn build_plan(catalog: &Catalog, goal_id: &str, recurring: &[String]) -> Result<CampaignPlan> {
    let goal = catalog
        .goal(goal_id)
        .with_context(|| format!("unknown goal '{goal_id}'"))?;
    let mut plan = CampaignPlan::new(goal.clone());
    for item_id in recurring {
        let item = catalog
            .item(item_id)
            .with_context(|| format!("unknown recurring item '{item_id}'"))?;
        plan = plan.with_recurring(item);
    }
    Ok(plan)
}
