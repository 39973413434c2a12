//! Eventual-consistency demo: the deferred post-upload refresh
//!
//! An upload schedules exactly one gallery refresh after a fixed delay, a
//! heuristic wait for the external thumbnail pipeline. This demo shortens
//! the delay, races the pipeline against it, and shows both outcomes: the
//! thumbnail landing in time, and the fallback when it does not.
//!
//! Run with: cargo run --example thumbnail_sync

use bytes::Bytes;
use photovault_client::{Config, GallerySnapshot, Photo, PhotoLibrary};
use photovault_gateway::{MemoryIdentityGateway, MemoryObjectStore};
use std::sync::Arc;
use std::time::Duration;

fn thumbnail_urls(snapshot: &GallerySnapshot) {
    if let GallerySnapshot::Photos(items) = snapshot {
        for item in items {
            let state = if item.thumbnail_url.contains("/thumbnails/") {
                "thumbnail"
            } else {
                "fallback to original"
            };
            println!("   - {} ({state})", item.original_key);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("⏱️  PhotoVault - Thumbnail Sync Demo\n");

    let identity = Arc::new(MemoryIdentityGateway::with_confirmed_user(
        "ada@example.com",
        "Pass1word!",
    ));
    let store = Arc::new(MemoryObjectStore::new());
    let config = Config::default().with_refresh_delay(Duration::from_millis(300));
    let library = PhotoLibrary::new(config, identity, Arc::clone(&store));

    library.sign_in("ada@example.com", "Pass1word!").await?;

    // A fast pipeline: the thumbnail exists before the deferred refresh.
    println!("📤 Uploading 'fast.png' (pipeline beats the refresh)...");
    let fast = library
        .upload(Some(Photo::new("fast.png", Bytes::from_static(b"pixels"))))
        .await?;
    store.generate_thumbnail(&fast)?;

    tokio::time::sleep(Duration::from_millis(400)).await;
    println!("   Gallery after the deferred refresh:");
    thumbnail_urls(&library.gallery());

    // A slow pipeline: the deferred refresh still shows the fallback, and a
    // later manual refresh picks the thumbnail up.
    println!("\n📤 Uploading 'slow.png' (pipeline loses the race)...");
    let slow = library
        .upload(Some(Photo::new("slow.png", Bytes::from_static(b"pixels"))))
        .await?;

    tokio::time::sleep(Duration::from_millis(400)).await;
    println!("   Gallery after the deferred refresh:");
    thumbnail_urls(&library.gallery());

    store.generate_thumbnail(&slow)?;
    library.refresh().await?;
    println!("\n   Gallery after a manual refresh:");
    thumbnail_urls(&library.gallery());

    println!("\n✨ Demo completed successfully!");

    Ok(())
}
