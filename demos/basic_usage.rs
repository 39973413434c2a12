//! Basic usage walkthrough for the PhotoVault client
//!
//! This demo runs the full account and gallery lifecycle against the
//! in-memory gateways:
//! - Registering and confirming an account
//! - Signing in
//! - Uploading a photo
//! - Watching the gallery resolve thumbnails
//! - Signing out
//!
//! Run with: cargo run --example basic_usage

use bytes::Bytes;
use photovault_client::{Config, GallerySnapshot, Photo, PhotoLibrary};
use photovault_gateway::{MemoryIdentityGateway, MemoryObjectStore};
use std::sync::Arc;

fn print_gallery(snapshot: &GallerySnapshot) {
    match snapshot {
        GallerySnapshot::SignedOut => println!("   Sign in to load thumbnails."),
        GallerySnapshot::Empty => println!("   No photos yet. Upload your first image."),
        GallerySnapshot::Photos(items) => {
            for item in items {
                println!("   - {}", item.original_key);
                println!("     thumb: {}", item.thumbnail_url);
                println!("     full:  {}", item.full_url);
            }
        }
        GallerySnapshot::Unavailable(message) => println!("   ⚠️  {message}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("📷 PhotoVault - Basic Usage Demo\n");

    let identity = Arc::new(MemoryIdentityGateway::new());
    let store = Arc::new(MemoryObjectStore::new());
    let library = PhotoLibrary::new(Config::default(), Arc::clone(&identity), Arc::clone(&store));

    // ==================== Account Lifecycle ====================

    println!("📝 Registering ada@example.com...");
    library.sign_up("ada@example.com", "Pass1word!").await?;

    // The code normally arrives by email; the in-memory provider exposes it.
    let code = identity.confirmation_code("ada@example.com").unwrap();
    println!("   Confirming with code {code}...");
    library.confirm_sign_up("ada@example.com", &code).await?;

    println!("\n🔐 Signing in...");
    let user = library.sign_in("ada@example.com", "Pass1word!").await?;
    println!("   Welcome back {}!", user.email);

    println!("\n🖼️  Gallery after sign-in:");
    print_gallery(&library.gallery());

    // ==================== Upload & Sync ====================

    println!("\n📤 Uploading 'cat.png'...");
    let photo = Photo::new("cat.png", Bytes::from_static(b"not really a png"));
    let key = library.upload(Some(photo)).await?;
    println!("   Stored as {key}");

    println!("\n🖼️  Gallery before the thumbnail exists (fallback URLs):");
    library.refresh().await?;
    print_gallery(&library.gallery());

    println!("\n⚙️  Thumbnail pipeline finishes...");
    store.generate_thumbnail(&key)?;

    println!("\n🖼️  Gallery after the next refresh:");
    library.refresh().await?;
    print_gallery(&library.gallery());

    // ==================== Sign Out ====================

    println!("\n👋 Signing out...");
    library.sign_out().await?;
    print_gallery(&library.gallery());

    println!("\n✨ Demo completed successfully!");

    Ok(())
}
