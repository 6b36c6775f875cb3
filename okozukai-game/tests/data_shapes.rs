use std::path::PathBuf;
use std::sync::Arc;

use okozukai_game::{
    CampaignController, CampaignPlan, CampaignSnapshot, Catalog, DataLoader, DirDataLoader,
    GameConfig, HappeningKind, StaticDataLoader, TemptationChoice,
};
use serde_json::Value;

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/data")
}

#[test]
fn bundled_catalog_matches_directory_catalog() {
    let bundled = StaticDataLoader.load_catalog().unwrap();
    let from_dir = DirDataLoader::new(assets_dir()).load_catalog().unwrap();
    assert_eq!(bundled, from_dir);

    let cfg: GameConfig = DirDataLoader::new(assets_dir())
        .load_config("config")
        .unwrap();
    assert_eq!(cfg, GameConfig::default());

    let config = GameConfig::default();
    assert!(bundled.goals_out_of_range(&config).is_empty());
    assert!(bundled.items.iter().all(|i| i.price > 0 && i.image.is_some()));
    assert!(
        bundled
            .happenings
            .iter()
            .any(|h| h.kind == HappeningKind::Negative && h.amount < 0)
    );
}

#[test]
fn happening_json_uses_type_field() {
    let catalog = Catalog::load_from_static().unwrap();
    let value = serde_json::to_value(&catalog.happenings[0]).unwrap();
    assert_eq!(value["type"], "positive");
    assert!(value.get("kind").is_none());
}

#[test]
fn snapshot_json_shape_is_stable() {
    let catalog = Arc::new(Catalog::load_from_static().unwrap());
    let goal = catalog.goal("block-set").unwrap().clone();
    let snack = catalog.item("snack").unwrap().clone();
    let mut ctl = CampaignController::seeded(GameConfig::default(), Arc::clone(&catalog), 1);
    ctl.start_campaign(&CampaignPlan::new(goal).with_recurring(&snack))
        .unwrap();
    ctl.acknowledge().unwrap();

    let snapshot = ctl.snapshot().unwrap();
    let value: Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(value["version"], 1);
    let campaign = &value["campaign"];
    assert_eq!(campaign["goal"]["id"], "block-set");
    assert_eq!(campaign["recurring_purchases"][0]["item_id"], "snack");
    assert_eq!(campaign["planned_months"], 12);
    assert_eq!(campaign["player"]["money"], 350);
    assert_eq!(campaign["state"]["current_month"], 4);
    assert_eq!(campaign["state"]["month"]["step"]["step"], "awaiting_recurring_ack");
    assert_eq!(campaign["state"]["month"]["step"]["expense"], 150);
    assert_eq!(value["rng"]["seed"], 1);
}

#[test]
fn restored_snapshot_plays_out_like_the_original() {
    let catalog = Arc::new(Catalog::load_from_static().unwrap());
    let goal = catalog.goal("board-game").unwrap().clone();
    let mut original = CampaignController::seeded(GameConfig::default(), Arc::clone(&catalog), 31);
    original.start_campaign(&CampaignPlan::new(goal)).unwrap();
    original.acknowledge().unwrap();

    let json = original.snapshot().unwrap().to_json().unwrap();
    let mut restored = CampaignController::restore(
        GameConfig::default(),
        Arc::clone(&catalog),
        CampaignSnapshot::from_json(&json).unwrap(),
        Box::new(okozukai_game::SequenceRandom::constant(0.0)),
    )
    .unwrap();

    loop {
        let view = original.view().unwrap();
        assert_eq!(restored.view().as_ref(), Some(&view));
        let (a, b) = if view.awaiting_decision() {
            (
                original.decide(TemptationChoice::Resist).unwrap(),
                restored.decide(TemptationChoice::Resist).unwrap(),
            )
        } else {
            (original.acknowledge().unwrap(), restored.acknowledge().unwrap())
        };
        assert_eq!(a, b);
        if a.is_finished() {
            break;
        }
    }
    assert_eq!(original.last_result(), restored.last_result());
}
