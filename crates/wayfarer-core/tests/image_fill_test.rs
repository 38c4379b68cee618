//! Integration tests for per-destination image fill: independence of the
//! requests, failure isolation and discarding results for replaced plans.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use wayfarer_core::images::ImageSettled;
use wayfarer_core::{ImageState, Planner, PlannerEvent};
use wayfarer_store::MemoryStore;
use wayfarer_test_utils::{
    FakeImageGenerator, FakePlanGenerator, ImageScript, planner_with, sample_params,
};

fn planner(images: FakeImageGenerator) -> (Arc<FakeImageGenerator>, Planner) {
    let images = Arc::new(images);
    let planner = planner_with(Arc::new(MemoryStore::new()), images.clone());
    (images, planner)
}

fn images_of(planner: &Planner) -> Vec<ImageState> {
    planner
        .plan()
        .unwrap()
        .itinerary
        .iter()
        .map(|d| d.image.clone())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn every_destination_settles_independently() {
    let (images, mut planner) = planner(
        FakeImageGenerator::new()
            .with_script("Rome", ImageScript::Fail)
            .with_script("Oslo", ImageScript::Empty)
            .with_script("Porto", ImageScript::Panic),
    );

    let plan = planner
        .generate(
            sample_params(&["Paris", "Rome", "Oslo", "Porto"]),
            &FakePlanGenerator::sample(),
        )
        .await
        .unwrap();
    assert!(plan.itinerary.iter().all(|d| d.image.is_pending()));

    planner.settle().await;
    assert_eq!(
        images_of(&planner),
        vec![
            ImageState::Resolved("img:Paris".to_owned()),
            ImageState::Failed,
            ImageState::Failed,
            ImageState::Failed,
        ]
    );
    assert_eq!(images.calls().len(), 4);
    assert!(!planner.has_pending_work());
}

#[tokio::test(start_paused = true)]
async fn fast_images_land_before_slow_ones() {
    let (_images, mut planner) = planner(
        FakeImageGenerator::new().with_delay("Oslo", Duration::from_secs(3)),
    );
    planner
        .generate(sample_params(&["Paris", "Oslo", "Rome"]), &FakePlanGenerator::sample())
        .await
        .unwrap();

    for _ in 0..2 {
        let event = planner.next_event().await.unwrap();
        assert!(planner.handle_event(event));
    }
    let states = images_of(&planner);
    assert!(matches!(states[0], ImageState::Resolved(_)));
    assert!(states[1].is_pending());
    assert!(matches!(states[2], ImageState::Resolved(_)));

    planner.settle().await;
    assert_eq!(
        images_of(&planner)[1],
        ImageState::Resolved("img:Oslo".to_owned())
    );
}

#[tokio::test(start_paused = true)]
async fn snapshots_are_not_mutated_by_later_settlements() {
    let (_images, mut planner) = planner(FakeImageGenerator::new());
    let before = planner
        .generate(sample_params(&["Paris"]), &FakePlanGenerator::sample())
        .await
        .unwrap();

    planner.settle().await;
    assert!(before.itinerary[0].image.is_pending());
    assert!(!planner.plan().unwrap().itinerary[0].image.is_pending());
}

#[tokio::test(start_paused = true)]
async fn results_for_a_replaced_plan_are_discarded() {
    let (_images, mut planner) = planner(
        FakeImageGenerator::new().with_delay("Oslo", Duration::from_secs(5)),
    );
    planner
        .generate(sample_params(&["Oslo"]), &FakePlanGenerator::sample())
        .await
        .unwrap();
    let first = planner.instance().unwrap();

    planner
        .generate(sample_params(&["Oslo", "Rome"]), &FakePlanGenerator::sample())
        .await
        .unwrap();
    let second = planner.instance().unwrap();
    assert_ne!(first, second);

    // A result addressed to the old instance never lands on the new plan.
    let stale = PlannerEvent::Image(ImageSettled {
        instance: first,
        index: 0,
        destination: "Oslo".to_owned(),
        outcome: ImageState::Resolved("stale".to_owned()),
    });
    assert!(!planner.handle_event(stale));
    assert!(images_of(&planner)[0].is_pending());

    planner.settle().await;
    assert_eq!(
        images_of(&planner),
        vec![
            ImageState::Resolved("img:Oslo".to_owned()),
            ImageState::Resolved("img:Rome".to_owned()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_instance_and_settled_slots_are_ignored() {
    let (_images, mut planner) = planner(FakeImageGenerator::new());
    planner
        .generate(sample_params(&["Paris"]), &FakePlanGenerator::sample())
        .await
        .unwrap();
    planner.settle().await;
    let instance = planner.instance().unwrap();

    let foreign = PlannerEvent::Image(ImageSettled {
        instance: Uuid::new_v4(),
        index: 0,
        destination: "Paris".to_owned(),
        outcome: ImageState::Failed,
    });
    assert!(!planner.handle_event(foreign));

    let late = PlannerEvent::Image(ImageSettled {
        instance,
        index: 0,
        destination: "Paris".to_owned(),
        outcome: ImageState::Failed,
    });
    assert!(!planner.handle_event(late));
    assert_eq!(
        images_of(&planner)[0],
        ImageState::Resolved("img:Paris".to_owned())
    );
}

#[tokio::test(start_paused = true)]
async fn fill_images_does_not_duplicate_in_flight_requests() {
    let (images, mut planner) = planner(
        FakeImageGenerator::new().with_delay("Paris", Duration::from_secs(1)),
    );
    planner
        .generate(sample_params(&["Paris"]), &FakePlanGenerator::sample())
        .await
        .unwrap();

    assert_eq!(planner.fill_images(), 0);
    planner.settle().await;
    assert_eq!(planner.fill_images(), 0);
    assert_eq!(images.calls(), vec!["Paris".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn clearing_the_plan_abandons_outstanding_requests() {
    let (_images, mut planner) = planner(
        FakeImageGenerator::new().with_delay("Paris", Duration::from_secs(1)),
    );
    planner
        .generate(sample_params(&["Paris"]), &FakePlanGenerator::sample())
        .await
        .unwrap();
    planner.clear();

    assert!(planner.plan().is_none());
    assert!(!planner.has_pending_work());
    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(planner.drain_ready(), 0);
}
