use savora::*;
use chrono::Utc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().await;

    // 1. Wire up the engine with the default configuration.
    let state = AppState::new(Config::default());
    println!("Catalog bounds: {:?}", state.config.catalog);

    // 2. Seed a small menu.
    let margherita = MenuItem::new(1, 1, 0, true);
    let arrabbiata = MenuItem::new(2, 1, 3, true);
    let vindaloo = MenuItem::new(5, 3, 5, false);
    let korma = MenuItem::new(6, 3, 1, true);

    for item in [&margherita, &arrabbiata, &vindaloo, &korma] {
        state.store.add_menu_item(item.clone()).await;
    }
    println!("Seeded {} menu items", 4);

    // 3. Record some browsing behaviour for our diner.
    let diner = Uuid::new_v4();
    let now = Utc::now();
    state
        .ledger
        .record(diner, margherita.id, InteractionKind::View, now);
    state
        .ledger
        .record(diner, arrabbiata.id, InteractionKind::MenuItemCartAdd, now);
    println!("Recorded {} interactions for diner {}", 2, diner);

    // 4. Ratings from the wider crowd push the system over the
    //    collaborative threshold.
    for _ in 0..5 {
        let other = Uuid::new_v4();
        state
            .store
            .upsert_rating(Rating::new(other, arrabbiata.id, 5))
            .await?;
        state
            .store
            .upsert_rating(Rating::new(other, korma.id, 4))
            .await?;
    }
    state
        .store
        .upsert_rating(Rating::new(diner, arrabbiata.id, 5))
        .await?;

    // 5. Ask for recommendations.
    let response = state.recommendation_service.recommend(diner).await?;

    println!(
        "\n{:?} recommendations for diner {}:",
        response.kind, response.user_id
    );
    for item in &response.items {
        println!(
            "  {} score={:.3} [{}]",
            item.item_id, item.score, item.explanation
        );
    }

    println!("\nFull response as the API layer would see it:");
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
