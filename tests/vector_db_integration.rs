//! Runs against a real Qdrant container; needs Docker.
//! `cargo test -- --ignored` to include it.

use anyhow::Result;
use local_rag::{DocumentToUpsert, VectorDb, VectorRepository};
use std::time::Duration;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};
use uuid::Uuid;

async fn setup_qdrant() -> Result<(VectorDb, ContainerAsync<GenericImage>)> {
    let image = GenericImage::new("qdrant/qdrant", "latest")
        .with_exposed_port(ContainerPort::Tcp(6334))
        .with_wait_for(WaitFor::message_on_stdout("Qdrant gRPC listening on 6334"));

    let container = image.start().await?;
    let grpc_port = container.get_host_port_ipv4(6334).await?;
    let qdrant_url = format!("http://localhost:{}", grpc_port);

    let collection_name = format!("test_coll_{}", Uuid::new_v4().as_simple());
    let vector_db = VectorDb::connect(&qdrant_url, collection_name, 3)?;
    vector_db.initialize_collection().await?;

    Ok((vector_db, container))
}

fn doc(source: &str, chunk_index: usize, text: &str, vector: Vec<f32>) -> DocumentToUpsert {
    DocumentToUpsert {
        source: source.to_string(),
        chunk_index,
        content_chunk: text.to_string(),
        vector,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_initialize_is_idempotent() -> Result<()> {
    let (vector_db, _container) = setup_qdrant().await?;
    vector_db.initialize_collection().await?;
    assert_eq!(vector_db.count().await?, 0);
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_upsert_search_and_count() -> Result<()> {
    let (vector_db, _container) = setup_qdrant().await?;

    let docs = vec![
        doc("a.txt", 0, "Chunk zero of a.", vec![0.1, 0.2, 0.7]),
        doc("b.txt", 0, "Chunk zero of b.", vec![0.8, 0.1, 0.1]),
        doc("a.txt", 1, "Chunk one of a.", vec![0.2, 0.3, 0.5]),
    ];
    vector_db.upsert_documents(&docs).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(vector_db.count().await?, 3);

    let results = vector_db.search(vec![0.15, 0.25, 0.6], 2, None).await?;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].source, "a.txt");
    assert_eq!(results[0].chunk_index, 0);
    assert_eq!(results[0].content_chunk, "Chunk zero of a.");
    assert!(results[0].score >= results[1].score);

    let strict = vector_db.search(vec![0.8, 0.1, 0.1], 5, Some(0.99)).await?;
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].source, "b.txt");
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_reset_empties_collection() -> Result<()> {
    let (vector_db, _container) = setup_qdrant().await?;
    vector_db
        .upsert_documents(&[doc("a.txt", 0, "text", vec![1.0, 0.0, 0.0])])
        .await?;
    assert_eq!(vector_db.count().await?, 1);

    vector_db.reset_collection().await?;
    assert_eq!(vector_db.count().await?, 0);
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_upsert_empty_is_noop() -> Result<()> {
    let (vector_db, _container) = setup_qdrant().await?;
    vector_db.upsert_documents(&[]).await?;
    assert_eq!(vector_db.count().await?, 0);
    Ok(())
}
