//! Import a document export into the store.
//!
//! The file is YAML or JSON with any of the top-level keys `orders`,
//! `preorders`, `products`, `users` and `settings`. Every document is
//! upserted by id, so re-running an import is safe.
//!
//! ```yaml
//! products:
//!   - id: lip-balm
//!     name: Rose Lip Balm
//!     price: 349
//!     slug: rose-lip-balm
//! settings:
//!   preorderEnabled: true
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use sareine_admin::db::{PgStore, Store, create_pool};
use sareine_admin::models::{Order, Preorder, Product, StoreSettings, User};

use super::{CliError, database_url};

/// Contents of an import file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    pub preorders: Vec<Preorder>,
    pub products: Vec<Product>,
    pub users: Vec<User>,
    pub settings: Option<StoreSettings>,
}

/// How many documents of each kind an import wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub orders: usize,
    pub preorders: usize,
    pub products: usize,
    pub users: usize,
    pub settings: bool,
}

/// File formats accepted by [`parse_snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnsupportedFormat`] for anything but
    /// `.yaml`, `.yml` and `.json`.
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(CliError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse an export in the given format.
///
/// # Errors
///
/// Returns [`CliError::Parse`] if the content does not match the document
/// shapes.
pub fn parse_snapshot(content: &str, format: Format) -> Result<Snapshot, CliError> {
    match format {
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| CliError::Parse(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| CliError::Parse(e.to_string())),
    }
}

/// Upsert every document of `snapshot` into `store`.
///
/// # Errors
///
/// Stops at the first store error; documents written before it stay written.
pub async fn apply(store: &dyn Store, snapshot: &Snapshot) -> Result<ImportSummary, CliError> {
    let mut summary = ImportSummary::default();

    for user in &snapshot.users {
        store.put_user(user).await?;
        summary.users += 1;
    }
    for product in &snapshot.products {
        store.put_product(product).await?;
        summary.products += 1;
    }
    for order in &snapshot.orders {
        store.put_order(order).await?;
        summary.orders += 1;
    }
    for preorder in &snapshot.preorders {
        store.put_preorder(preorder).await?;
        summary.preorders += 1;
    }
    if let Some(settings) = &snapshot.settings {
        store.save_settings(settings).await?;
        summary.settings = true;
    }

    Ok(summary)
}

/// Import `file_path` into the database.
///
/// With `dry_run` the file is parsed and summarised without connecting.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the database URL
/// is missing, or a write fails.
pub async fn run(file_path: &str, dry_run: bool) -> Result<ImportSummary, CliError> {
    let path = Path::new(file_path);
    let format = Format::from_path(path)?;

    info!(path = %file_path, ?format, "Loading import file");
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: file_path.to_string(),
            source,
        })?;
    let snapshot = parse_snapshot(&content, format)?;

    if dry_run {
        warn!("Dry run: nothing will be written");
        return Ok(ImportSummary {
            orders: snapshot.orders.len(),
            preorders: snapshot.preorders.len(),
            products: snapshot.products.len(),
            users: snapshot.users.len(),
            settings: snapshot.settings.is_some(),
        });
    }

    let pool = create_pool(&database_url()?).await?;
    let store = PgStore::new(pool);
    let summary = apply(&store, &snapshot).await?;

    info!(
        orders = summary.orders,
        preorders = summary.preorders,
        products = summary.products,
        users = summary.users,
        settings = summary.settings,
        "Import complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sareine_admin::db::MemoryStore;
    use sareine_core::{OrderId, OrderStatus, PreorderStatus};

    use super::*;

    const EXPORT: &str = r"
orders:
  - id: ord-1
    customerName: Meera
    customerEmail: meera@example.in
    amount: 1299
    status: dispatched
    items:
      - name: Rose Lip Balm
        price: 349
        quantity: 2
    createdAt: 2026-01-05T10:00:00Z
preorders:
  - id: pre-1
    preorderId: SAR-001
    customerEmail: asha@example.in
    amount: '850'
    status: pending_confirmation
    createdAt:
      _seconds: 1767225600
      _nanoseconds: 0
products:
  - id: lip-balm
    name: Rose Lip Balm
    price: 349
    slug: rose-lip-balm
settings:
  preorderEnabled: true
";

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("dump.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("dump.json")).unwrap(), Format::Json);
        assert!(matches!(
            Format::from_path(Path::new("dump.csv")),
            Err(CliError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_parse_yaml_export() {
        let snapshot = parse_snapshot(EXPORT, Format::Yaml).unwrap();
        assert_eq!(snapshot.orders.len(), 1);
        assert_eq!(snapshot.orders[0].status, OrderStatus::Dispatched);
        assert_eq!(snapshot.preorders[0].status, PreorderStatus::PendingConfirmation);
        assert!(snapshot.preorders[0].created_at.is_some());
        assert!(snapshot.users.is_empty());
        assert!(snapshot.settings.unwrap().preorder_enabled);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = parse_snapshot(r#"{"orders": [{"customerName": "no id"}]}"#, Format::Json);
        assert!(matches!(err, Err(CliError::Parse(_))));
    }

    #[tokio::test]
    async fn test_apply_upserts_documents() {
        let store = MemoryStore::new();
        let snapshot = parse_snapshot(EXPORT, Format::Yaml).unwrap();

        let first = apply(&store, &snapshot).await.unwrap();
        let second = apply(&store, &snapshot).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.orders, 1);
        assert!(first.settings);

        assert_eq!(store.list_orders(None).await.unwrap().len(), 1);
        let order = store.get_order(&OrderId::new("ord-1")).await.unwrap().unwrap();
        assert_eq!(order.customer_name, "Meera");
        assert!(store.load_settings().await.unwrap().unwrap().preorder_enabled);
    }
}
