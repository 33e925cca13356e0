//! `MongoDB` repository implementations.
//!
//! All three repositories share one `mongodb::Database` handle, created once
//! at startup from a single long-lived `Client`.
//!
//! # Collections
//!
//! ```text
//! products { _id: ObjectId, name, price: double, description?, image?, stock: int }
//! carts    { userId: string, items: [{ productId: ObjectId, quantity: int }] }
//! orders   { _id: ObjectId, userId: string,
//!            items: [{ productId: ObjectId, quantity: int, price: double }],
//!            total: double, customerInfo: { name, address, phone },
//!            status: "pending" | "completed" | "cancelled", createdAt: Date }
//! ```

use futures::{FutureExt, TryStreamExt};
use mongodb::bson::{DateTime as BsonDateTime, doc, oid::ObjectId};
use mongodb::{Client, Collection, Database};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Cart, CartItem, CustomerInfo, Order, OrderId, OrderLineItem, OrderStatus, Product, ProductId,
    Timestamp, UserId,
};
use crate::infrastructure::{
    CartRepository, OrderRepository, ProductRepository, RepositoryError, RepositoryFuture,
};

const PRODUCTS_COLLECTION: &str = "products";
const CARTS_COLLECTION: &str = "carts";
const ORDERS_COLLECTION: &str = "orders";

fn database_error(error: &mongodb::error::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

fn count_from_document(field: &str, value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| {
        RepositoryError::SerializationError(format!("{field} out of range: {value}"))
    })
}

/// Connects to `MongoDB` and returns a handle to `database_name`.
///
/// # Errors
///
/// Returns `RepositoryError::DatabaseError` if the URI cannot be parsed or
/// the client cannot be created.
pub async fn connect(uri: &str, database_name: &str) -> Result<Database, RepositoryError> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(|error| database_error(&error))?;
    Ok(client.database(database_name))
}

// =============================================================================
// Documents
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(default)]
    stock: i64,
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        Self {
            id: *product.product_id.as_object_id(),
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            image: product.image.clone(),
            stock: i64::from(product.stock),
        }
    }
}

impl TryFrom<ProductDocument> for Product {
    type Error = RepositoryError;

    fn try_from(document: ProductDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: ProductId::from_object_id(document.id),
            name: document.name,
            price: document.price,
            description: document.description,
            image: document.image.filter(|image| !image.is_empty()),
            stock: count_from_document("stock", document.stock)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemDocument {
    product_id: ObjectId,
    quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartDocument {
    user_id: String,
    #[serde(default)]
    items: Vec<CartItemDocument>,
}

impl From<&Cart> for CartDocument {
    fn from(cart: &Cart) -> Self {
        Self {
            user_id: cart.user_id.as_str().to_string(),
            items: cart
                .items
                .iter()
                .map(|item| CartItemDocument {
                    product_id: *item.product_id.as_object_id(),
                    quantity: i64::from(item.quantity),
                })
                .collect(),
        }
    }
}

impl TryFrom<CartDocument> for Cart {
    type Error = RepositoryError;

    fn try_from(document: CartDocument) -> Result<Self, Self::Error> {
        let items = document
            .items
            .into_iter()
            .map(|item| {
                Ok(CartItem {
                    product_id: ProductId::from_object_id(item.product_id),
                    quantity: count_from_document("quantity", item.quantity)?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Self {
            user_id: UserId::new(document.user_id),
            items,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderItemDocument {
    product_id: ObjectId,
    quantity: i64,
    #[serde(default, with = "rust_decimal::serde::float")]
    price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CustomerInfoDocument {
    name: String,
    address: String,
    phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    user_id: String,
    items: Vec<OrderItemDocument>,
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
    customer_info: CustomerInfoDocument,
    status: String,
    created_at: BsonDateTime,
}

impl From<&Order> for OrderDocument {
    fn from(order: &Order) -> Self {
        Self {
            id: *order.order_id.as_object_id(),
            user_id: order.user_id.as_str().to_string(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemDocument {
                    product_id: *item.product_id.as_object_id(),
                    quantity: i64::from(item.quantity),
                    price: item.price,
                })
                .collect(),
            total: order.total,
            customer_info: CustomerInfoDocument {
                name: order.customer_info.name.clone(),
                address: order.customer_info.address.clone(),
                phone: order.customer_info.phone.clone(),
            },
            status: order.status.as_str().to_string(),
            created_at: BsonDateTime::from_millis(order.created_at.timestamp_millis()),
        }
    }
}

impl TryFrom<OrderDocument> for Order {
    type Error = RepositoryError;

    fn try_from(document: OrderDocument) -> Result<Self, Self::Error> {
        let items = document
            .items
            .into_iter()
            .map(|item| {
                Ok(OrderLineItem {
                    product_id: ProductId::from_object_id(item.product_id),
                    quantity: count_from_document("quantity", item.quantity)?,
                    price: item.price,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        let status = document
            .status
            .parse::<OrderStatus>()
            .map_err(|error| RepositoryError::SerializationError(error.to_string()))?;
        let created_at = Timestamp::from_timestamp_millis(document.created_at.timestamp_millis())
            .ok_or_else(|| {
                RepositoryError::SerializationError("createdAt out of range".to_string())
            })?;

        Ok(Self {
            order_id: OrderId::from_object_id(document.id),
            user_id: UserId::new(document.user_id),
            items,
            total: document.total,
            customer_info: CustomerInfo {
                name: document.customer_info.name,
                address: document.customer_info.address,
                phone: document.customer_info.phone,
            },
            status,
            created_at,
        })
    }
}

fn into_domain<D, T>(documents: Vec<D>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<D, Error = RepositoryError>,
{
    documents.into_iter().map(T::try_from).collect()
}

// =============================================================================
// MongoDB Product Repository
// =============================================================================

/// `MongoDB` implementation of `ProductRepository`.
#[derive(Debug, Clone)]
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    /// Creates a repository over the `products` collection of `database`.
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(PRODUCTS_COLLECTION),
        }
    }
}

impl ProductRepository for MongoProductRepository {
    fn find_all(&self) -> RepositoryFuture<Vec<Product>> {
        let collection = self.collection.clone();

        async move {
            let documents: Vec<ProductDocument> = collection
                .find(doc! {})
                .sort(doc! { "_id": 1 })
                .await
                .map_err(|error| database_error(&error))?
                .try_collect()
                .await
                .map_err(|error| database_error(&error))?;
            into_domain(documents)
        }
        .boxed()
    }

    fn search_by_name(&self, query: &str) -> RepositoryFuture<Vec<Product>> {
        let collection = self.collection.clone();
        let pattern = regex::escape(query);

        async move {
            let documents: Vec<ProductDocument> = collection
                .find(doc! { "name": { "$regex": pattern, "$options": "i" } })
                .sort(doc! { "_id": 1 })
                .await
                .map_err(|error| database_error(&error))?
                .try_collect()
                .await
                .map_err(|error| database_error(&error))?;
            into_domain(documents)
        }
        .boxed()
    }

    fn find_by_id(&self, id: &ProductId) -> RepositoryFuture<Option<Product>> {
        let collection = self.collection.clone();
        let object_id = *id.as_object_id();

        async move {
            collection
                .find_one(doc! { "_id": object_id })
                .await
                .map_err(|error| database_error(&error))?
                .map(Product::try_from)
                .transpose()
        }
        .boxed()
    }

    fn find_by_ids(&self, ids: &[ProductId]) -> RepositoryFuture<Vec<Product>> {
        let collection = self.collection.clone();
        let object_ids: Vec<ObjectId> = ids.iter().map(|id| *id.as_object_id()).collect();

        async move {
            if object_ids.is_empty() {
                return Ok(Vec::new());
            }
            let documents: Vec<ProductDocument> = collection
                .find(doc! { "_id": { "$in": object_ids } })
                .await
                .map_err(|error| database_error(&error))?
                .try_collect()
                .await
                .map_err(|error| database_error(&error))?;
            into_domain(documents)
        }
        .boxed()
    }

    fn save(&self, product: &Product) -> RepositoryFuture<()> {
        let collection = self.collection.clone();
        let document = ProductDocument::from(product);

        async move {
            collection
                .replace_one(doc! { "_id": document.id }, &document)
                .upsert(true)
                .await
                .map_err(|error| database_error(&error))?;
            Ok(())
        }
        .boxed()
    }

    fn delete(&self, id: &ProductId) -> RepositoryFuture<bool> {
        let collection = self.collection.clone();
        let object_id = *id.as_object_id();

        async move {
            let result = collection
                .delete_one(doc! { "_id": object_id })
                .await
                .map_err(|error| database_error(&error))?;
            Ok(result.deleted_count > 0)
        }
        .boxed()
    }
}

// =============================================================================
// MongoDB Cart Repository
// =============================================================================

/// `MongoDB` implementation of `CartRepository`.
///
/// Carts are keyed by `userId`; the document `_id` is left to the server.
#[derive(Debug, Clone)]
pub struct MongoCartRepository {
    collection: Collection<CartDocument>,
}

impl MongoCartRepository {
    /// Creates a repository over the `carts` collection of `database`.
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(CARTS_COLLECTION),
        }
    }
}

impl CartRepository for MongoCartRepository {
    fn find_by_user(&self, user_id: &UserId) -> RepositoryFuture<Option<Cart>> {
        let collection = self.collection.clone();
        let user_id = user_id.as_str().to_string();

        async move {
            collection
                .find_one(doc! { "userId": user_id })
                .await
                .map_err(|error| database_error(&error))?
                .map(Cart::try_from)
                .transpose()
        }
        .boxed()
    }

    fn save(&self, cart: &Cart) -> RepositoryFuture<()> {
        let collection = self.collection.clone();
        let document = CartDocument::from(cart);

        async move {
            collection
                .replace_one(doc! { "userId": document.user_id.as_str() }, &document)
                .upsert(true)
                .await
                .map_err(|error| database_error(&error))?;
            Ok(())
        }
        .boxed()
    }
}

// =============================================================================
// MongoDB Order Repository
// =============================================================================

/// `MongoDB` implementation of `OrderRepository`.
#[derive(Debug, Clone)]
pub struct MongoOrderRepository {
    collection: Collection<OrderDocument>,
}

impl MongoOrderRepository {
    /// Creates a repository over the `orders` collection of `database`.
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(ORDERS_COLLECTION),
        }
    }
}

impl OrderRepository for MongoOrderRepository {
    fn find_all(&self) -> RepositoryFuture<Vec<Order>> {
        let collection = self.collection.clone();

        async move {
            let documents: Vec<OrderDocument> = collection
                .find(doc! {})
                .sort(doc! { "_id": 1 })
                .await
                .map_err(|error| database_error(&error))?
                .try_collect()
                .await
                .map_err(|error| database_error(&error))?;
            into_domain(documents)
        }
        .boxed()
    }

    fn find_by_user(&self, user_id: &UserId) -> RepositoryFuture<Vec<Order>> {
        let collection = self.collection.clone();
        let user_id = user_id.as_str().to_string();

        async move {
            let documents: Vec<OrderDocument> = collection
                .find(doc! { "userId": user_id })
                .sort(doc! { "_id": 1 })
                .await
                .map_err(|error| database_error(&error))?
                .try_collect()
                .await
                .map_err(|error| database_error(&error))?;
            into_domain(documents)
        }
        .boxed()
    }

    fn find_by_id(&self, id: &OrderId) -> RepositoryFuture<Option<Order>> {
        let collection = self.collection.clone();
        let object_id = *id.as_object_id();

        async move {
            collection
                .find_one(doc! { "_id": object_id })
                .await
                .map_err(|error| database_error(&error))?
                .map(Order::try_from)
                .transpose()
        }
        .boxed()
    }

    fn save(&self, order: &Order) -> RepositoryFuture<()> {
        let collection = self.collection.clone();
        let document = OrderDocument::from(order);

        async move {
            collection
                .replace_one(doc! { "_id": document.id }, &document)
                .upsert(true)
                .await
                .map_err(|error| database_error(&error))?;
            Ok(())
        }
        .boxed()
    }
}
