//! Default catalog used to populate a fresh store.

use sqlx::SqlitePool;

use corner_shop_core::Price;

use crate::db::{self, ProductRepository, RepositoryError};
use crate::models::product::NewProduct;

/// `(name, description, price in cents, stock)`.
pub const DEFAULT_CATALOG: &[(&str, &str, i64, i64)] = &[
    (
        "Notebook Dell Inspiron 15",
        "Intel Core i5 laptop with 8GB RAM and a 256GB SSD",
        249_990,
        10,
    ),
    (
        "Mouse Logitech MX Master 3",
        "Ergonomic wireless mouse with a high-precision sensor",
        39_990,
        25,
    ),
    (
        "Mechanical RGB Keyboard",
        "Mechanical keyboard with blue switches and RGB lighting",
        59_990,
        15,
    ),
    (
        "Monitor LG UltraWide 29\"",
        "29-inch Full HD IPS ultrawide monitor",
        129_990,
        8,
    ),
    (
        "Webcam Logitech C920",
        "Full HD 1080p webcam with stereo microphone",
        49_990,
        20,
    ),
    (
        "Headset HyperX Cloud II",
        "Gaming headset with 7.1 surround sound and detachable microphone",
        69_990,
        12,
    ),
    (
        "SSD Samsung 1TB",
        "1TB NVMe M.2 SSD with reads up to 3500MB/s",
        59_990,
        30,
    ),
    (
        "Graphics Card RTX 3060",
        "NVIDIA GeForce RTX 3060 12GB graphics card",
        249_990,
        5,
    ),
    (
        "Smartphone Samsung Galaxy S23",
        "Android phone with 6.1\" AMOLED display, 128GB and 50MP triple camera",
        329_990,
        15,
    ),
    (
        "Tablet iPad Air 10.9\"",
        "Apple tablet with M1 chip, 64GB, Retina display and Apple Pencil support",
        429_990,
        7,
    ),
    (
        "Smartwatch Apple Watch Series 9",
        "Smartwatch with GPS, health tracking and always-on display",
        299_990,
        12,
    ),
    (
        "AirPods Pro",
        "Bluetooth earbuds with active noise cancelling and spatial audio",
        189_990,
        20,
    ),
    (
        "Speaker JBL Charge 5",
        "Waterproof Bluetooth speaker with 20-hour battery",
        89_990,
        18,
    ),
    (
        "Router TP-Link Archer AX50",
        "Dual-band Wi-Fi 6 router, up to 3Gbps",
        69_990,
        14,
    ),
    (
        "External HDD Seagate 2TB",
        "Portable 2TB USB 3.0 drive for backup and storage",
        44_990,
        25,
    ),
    (
        "HP All-in-One Printer",
        "Inkjet printer with scanner, copier and Wi-Fi",
        59_990,
        10,
    ),
    (
        "Camera Canon EOS R50",
        "Mirrorless camera with 18-45mm lens, 24.2MP and 4K recording",
        449_990,
        6,
    ),
    (
        "Drone DJI Mini 3",
        "Compact drone with 4K camera, 30-minute flight time, under 250g",
        329_990,
        8,
    ),
    (
        "Gaming Mousepad RGB",
        "RGB gaming mousepad with control surface and non-slip base",
        19_990,
        30,
    ),
    (
        "USB-C Hub 7-in-1",
        "USB-C hub with HDMI, USB 3.0, SD card reader and pass-through charging",
        24_990,
        22,
    ),
];

/// Insert [`DEFAULT_CATALOG`] if the products table is empty.
///
/// Returns the number of products inserted (zero when a catalog exists).
///
/// # Errors
///
/// Returns `RepositoryError` if any insert fails; nothing is inserted then.
pub async fn seed_catalog(pool: &SqlitePool) -> Result<usize, RepositoryError> {
    let mut tx = db::begin_write(pool).await?;
    let mut products = ProductRepository::new(&mut tx);

    if products.count().await? > 0 {
        tracing::info!("Catalog already present, skipping seed");
        return Ok(0);
    }

    for &(name, description, cents, stock) in DEFAULT_CATALOG {
        let price = Price::from_cents(cents)
            .map_err(|e| RepositoryError::DataCorruption(format!("seed price for {name}: {e}")))?;
        products
            .create(&NewProduct {
                name: name.to_owned(),
                description: description.to_owned(),
                price,
                stock,
            })
            .await?;
    }

    tx.commit().await?;
    tracing::info!(count = DEFAULT_CATALOG.len(), "Catalog seeded");
    Ok(DEFAULT_CATALOG.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        assert_eq!(DEFAULT_CATALOG.len(), 20);
        for &(name, _, cents, stock) in DEFAULT_CATALOG {
            assert!(!name.is_empty());
            assert!(Price::from_cents(cents).is_ok(), "{name}");
            assert!(stock > 0, "{name}");
        }
    }
}
