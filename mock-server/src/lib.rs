//! In-memory imitation of the configuration portal's OpenAPI.
//!
//! Covers the endpoints the client calls, with the portal's status
//! conventions: 401 for a bad token, 400 for invalid parameters, 404 for
//! unknown resources, 405 from the router for a wrong method.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub name: String,
    pub app_id: String,
    pub org_id: String,
    pub org_name: String,
    pub owner_name: String,
    pub owner_email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvWithClusters {
    pub env: String,
    pub clusters: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub key: String,
    pub value: String,
    pub comment: String,
    pub data_change_created_by: String,
    pub data_change_last_modified_by: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub app_id: String,
    pub cluster_name: String,
    pub namespace_name: String,
    pub comment: String,
    pub format: String,
    pub is_public: bool,
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppNamespace {
    pub name: String,
    pub app_id: String,
    pub format: String,
    pub is_public: bool,
    pub comment: String,
    pub data_change_created_by: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceLock {
    pub namespace_name: String,
    pub is_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub app_id: String,
    pub cluster_name: String,
    pub namespace_name: String,
    pub name: String,
    pub configurations: BTreeMap<String, String>,
    pub comment: String,
    pub data_change_created_by: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNamespace {
    pub name: String,
    pub app_id: String,
    pub format: String,
    #[serde(default)]
    pub is_public: bool,
    pub data_change_created_by: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItem {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub comment: String,
    pub data_change_created_by: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub comment: String,
    pub data_change_last_modified_by: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRelease {
    pub release_title: String,
    #[serde(default)]
    pub release_comment: String,
    pub released_by: String,
}

/// A namespace bound to one env/app/cluster.
#[derive(Clone, Debug, Default)]
struct NamespaceState {
    format: String,
    is_public: bool,
    comment: String,
    items: Vec<Item>,
    releases: Vec<Release>,
    locked_by: Option<String>,
}

/// (env, app, cluster, namespace)
type NamespaceKey = (String, String, String, String);

#[derive(Debug, Default)]
pub struct Store {
    apps: Vec<App>,
    clusters: HashMap<String, Vec<EnvWithClusters>>,
    app_namespaces: Vec<AppNamespace>,
    namespaces: BTreeMap<NamespaceKey, NamespaceState>,
}

impl Store {
    /// `SampleApp` with cluster `default` in `DEV`, holding an empty
    /// `application` properties namespace.
    pub fn sample() -> Self {
        let mut store = Store::default();
        store.add_app(
            App {
                name: "Sample App".to_string(),
                app_id: "SampleApp".to_string(),
                org_id: "TEST1".to_string(),
                org_name: "Sample Org".to_string(),
                owner_name: "apollo".to_string(),
                owner_email: "apollo@example.com".to_string(),
            },
            vec![EnvWithClusters {
                env: "DEV".to_string(),
                clusters: vec!["default".to_string()],
            }],
        );
        store
    }

    /// Registers an app and binds an `application` namespace in each of its
    /// clusters.
    pub fn add_app(&mut self, app: App, clusters: Vec<EnvWithClusters>) {
        for env in &clusters {
            for cluster in &env.clusters {
                self.namespaces.insert(
                    (
                        env.env.clone(),
                        app.app_id.clone(),
                        cluster.clone(),
                        "application".to_string(),
                    ),
                    NamespaceState {
                        format: "properties".to_string(),
                        ..Default::default()
                    },
                );
            }
        }
        self.clusters.insert(app.app_id.clone(), clusters);
        self.apps.push(app);
    }
}

#[derive(Clone)]
pub struct Portal {
    token: Arc<str>,
    store: Arc<RwLock<Store>>,
}

/// Router seeded with [`Store::sample`], accepting only `token`.
pub fn app(token: &str) -> Router {
    app_with_store(token, Store::sample())
}

pub fn app_with_store(token: &str, store: Store) -> Router {
    let portal = Portal {
        token: Arc::from(token),
        store: Arc::new(RwLock::new(store)),
    };
    let ns = "/openapi/v1/envs/{env}/apps/{app_id}/clusters/{cluster}/namespaces";
    Router::new()
        .route("/openapi/v1/apps", get(list_apps))
        .route("/openapi/v1/apps/{app_id}/envclusters", get(env_clusters))
        .route("/openapi/v1/apps/{app_id}/appnamespaces", post(create_namespace))
        .route(ns, get(list_namespaces))
        .route(&format!("{ns}/{{namespace}}"), get(get_namespace))
        .route(&format!("{ns}/{{namespace}}/lock"), get(get_lock))
        .route(&format!("{ns}/{{namespace}}/items"), post(add_item))
        .route(
            &format!("{ns}/{{namespace}}/items/{{key}}"),
            put(update_item).delete(delete_item),
        )
        .route(&format!("{ns}/{{namespace}}/releases"), post(publish_release))
        .route(&format!("{ns}/{{namespace}}/releases/latest"), get(latest_release))
        .route_layer(middleware::from_fn_with_state(portal.clone(), require_token))
        .with_state(portal)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

async fn require_token(State(portal): State<Portal>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented != Some(&*portal.token) {
        tracing::warn!(uri = %request.uri(), "rejected request with bad token");
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

/// The portal answers 400 for any body it cannot read, not axum's 415/422.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, StatusCode> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected request body");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

async fn list_apps(State(portal): State<Portal>) -> Json<Vec<App>> {
    Json(portal.store.read().await.apps.clone())
}

async fn env_clusters(
    State(portal): State<Portal>,
    Path(app_id): Path<String>,
) -> Result<Json<Vec<EnvWithClusters>>, StatusCode> {
    let store = portal.store.read().await;
    store
        .clusters
        .get(&app_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNamespaceQuery {
    #[serde(default)]
    append_namespace_prefix: bool,
}

async fn create_namespace(
    State(portal): State<Portal>,
    Path(app_id): Path<String>,
    Query(query): Query<CreateNamespaceQuery>,
    input: Result<Json<CreateNamespace>, JsonRejection>,
) -> Result<Json<AppNamespace>, StatusCode> {
    let input = json_body(input)?;
    const FORMATS: [&str; 5] = ["properties", "xml", "yml", "yaml", "json"];
    if input.app_id != app_id || input.name.is_empty() || !FORMATS.contains(&input.format.as_str())
    {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut store = portal.store.write().await;
    let app = store
        .apps
        .iter()
        .find(|a| a.app_id == app_id)
        .cloned()
        .ok_or(StatusCode::BAD_REQUEST)?;

    let mut name = input.name;
    if input.is_public && query.append_namespace_prefix {
        name = format!("{}.{name}", app.org_id);
    }
    if input.format != "properties" {
        name = format!("{name}.{}", input.format);
    }
    if store.app_namespaces.iter().any(|n| n.name == name) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let created = AppNamespace {
        name: name.clone(),
        app_id: app_id.clone(),
        format: input.format.clone(),
        is_public: input.is_public,
        comment: input.comment.clone(),
        data_change_created_by: input.data_change_created_by,
    };
    store.app_namespaces.push(created.clone());

    let bindings: Vec<(String, String)> = store
        .clusters
        .get(&app_id)
        .into_iter()
        .flatten()
        .flat_map(|e| e.clusters.iter().map(move |c| (e.env.clone(), c.clone())))
        .collect();
    for (env, cluster) in bindings {
        store.namespaces.insert(
            (env, app_id.clone(), cluster, name.clone()),
            NamespaceState {
                format: input.format.clone(),
                is_public: input.is_public,
                comment: input.comment.clone(),
                ..Default::default()
            },
        );
    }

    Ok(Json(created))
}

fn render(key: &NamespaceKey, state: &NamespaceState) -> Namespace {
    Namespace {
        app_id: key.1.clone(),
        cluster_name: key.2.clone(),
        namespace_name: key.3.clone(),
        comment: state.comment.clone(),
        format: state.format.clone(),
        is_public: state.is_public,
        items: state.items.clone(),
    }
}

async fn list_namespaces(
    State(portal): State<Portal>,
    Path((env, app_id, cluster)): Path<(String, String, String)>,
) -> Result<Json<Vec<Namespace>>, StatusCode> {
    let store = portal.store.read().await;
    let known = store
        .clusters
        .get(&app_id)
        .is_some_and(|envs| envs.iter().any(|e| e.env == env && e.clusters.contains(&cluster)));
    if !known {
        return Err(StatusCode::NOT_FOUND);
    }
    let namespaces = store
        .namespaces
        .iter()
        .filter(|(k, _)| k.0 == env && k.1 == app_id && k.2 == cluster)
        .map(|(k, state)| render(k, state))
        .collect();
    Ok(Json(namespaces))
}

async fn get_namespace(
    State(portal): State<Portal>,
    Path(key): Path<NamespaceKey>,
) -> Result<Json<Namespace>, StatusCode> {
    let store = portal.store.read().await;
    let state = store.namespaces.get(&key).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(render(&key, state)))
}

async fn get_lock(
    State(portal): State<Portal>,
    Path(key): Path<NamespaceKey>,
) -> Result<Json<NamespaceLock>, StatusCode> {
    let store = portal.store.read().await;
    let state = store.namespaces.get(&key).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(NamespaceLock {
        namespace_name: key.3.clone(),
        is_locked: state.locked_by.is_some(),
        locked_by: state.locked_by.clone(),
    }))
}

async fn add_item(
    State(portal): State<Portal>,
    Path(key): Path<NamespaceKey>,
    input: Result<Json<AddItem>, JsonRejection>,
) -> Result<Json<Item>, StatusCode> {
    let input = json_body(input)?;
    if input.key.is_empty() || input.data_change_created_by.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = portal.store.write().await;
    let state = store.namespaces.get_mut(&key).ok_or(StatusCode::NOT_FOUND)?;
    if state.items.iter().any(|i| i.key == input.key) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let item = Item {
        key: input.key,
        value: input.value,
        comment: input.comment,
        data_change_created_by: input.data_change_created_by.clone(),
        data_change_last_modified_by: input.data_change_created_by.clone(),
    };
    state.items.push(item.clone());
    state.locked_by = Some(input.data_change_created_by);
    Ok(Json(item))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateItemQuery {
    #[serde(default)]
    create_if_not_exists: bool,
}

async fn update_item(
    State(portal): State<Portal>,
    Path((env, app_id, cluster, namespace, item_key)): Path<(String, String, String, String, String)>,
    Query(query): Query<UpdateItemQuery>,
    input: Result<Json<UpdateItem>, JsonRejection>,
) -> Result<StatusCode, StatusCode> {
    let input = json_body(input)?;
    if input.key != item_key || input.data_change_last_modified_by.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = portal.store.write().await;
    let state = store
        .namespaces
        .get_mut(&(env, app_id, cluster, namespace))
        .ok_or(StatusCode::NOT_FOUND)?;

    match state.items.iter().position(|i| i.key == item_key) {
        Some(index) => {
            let item = &mut state.items[index];
            item.value = input.value;
            item.comment = input.comment;
            item.data_change_last_modified_by = input.data_change_last_modified_by.clone();
        }
        None if query.create_if_not_exists => state.items.push(Item {
            key: input.key,
            value: input.value,
            comment: input.comment,
            data_change_created_by: input.data_change_last_modified_by.clone(),
            data_change_last_modified_by: input.data_change_last_modified_by.clone(),
        }),
        None => return Err(StatusCode::NOT_FOUND),
    }
    state.locked_by = Some(input.data_change_last_modified_by);
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct DeleteItemQuery {
    operator: Option<String>,
}

async fn delete_item(
    State(portal): State<Portal>,
    Path((env, app_id, cluster, namespace, item_key)): Path<(String, String, String, String, String)>,
    Query(query): Query<DeleteItemQuery>,
) -> Result<StatusCode, StatusCode> {
    let operator = query
        .operator
        .filter(|o| !o.is_empty())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let mut store = portal.store.write().await;
    let state = store
        .namespaces
        .get_mut(&(env, app_id, cluster, namespace))
        .ok_or(StatusCode::NOT_FOUND)?;
    let before = state.items.len();
    state.items.retain(|i| i.key != item_key);
    if state.items.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    state.locked_by = Some(operator);
    Ok(StatusCode::OK)
}

async fn publish_release(
    State(portal): State<Portal>,
    Path(key): Path<NamespaceKey>,
    input: Result<Json<PublishRelease>, JsonRejection>,
) -> Result<Json<Release>, StatusCode> {
    let input = json_body(input)?;
    if input.release_title.is_empty() || input.released_by.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = portal.store.write().await;
    let state = store.namespaces.get_mut(&key).ok_or(StatusCode::NOT_FOUND)?;
    let release = Release {
        app_id: key.1.clone(),
        cluster_name: key.2.clone(),
        namespace_name: key.3.clone(),
        name: input.release_title,
        configurations: state
            .items
            .iter()
            .map(|i| (i.key.clone(), i.value.clone()))
            .collect(),
        comment: input.release_comment,
        data_change_created_by: input.released_by,
    };
    state.releases.push(release.clone());
    state.locked_by = None;
    Ok(Json(release))
}

async fn latest_release(
    State(portal): State<Portal>,
    Path(key): Path<NamespaceKey>,
) -> Result<Json<Release>, StatusCode> {
    let store = portal.store.read().await;
    let state = store.namespaces.get(&key).ok_or(StatusCode::NOT_FOUND)?;
    state
        .releases
        .last()
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_store_binds_application_namespace() {
        let store = Store::sample();
        let key = (
            "DEV".to_string(),
            "SampleApp".to_string(),
            "default".to_string(),
            "application".to_string(),
        );
        let state = store.namespaces.get(&key).unwrap();
        assert_eq!(state.format, "properties");
        assert!(state.items.is_empty());
        assert_eq!(store.apps.len(), 1);
    }

    #[test]
    fn unlocked_namespace_omits_owner() {
        let lock = NamespaceLock {
            namespace_name: "application".to_string(),
            is_locked: false,
            locked_by: None,
        };
        let json = serde_json::to_value(&lock).unwrap();
        assert_eq!(json["isLocked"], false);
        assert!(json.get("lockedBy").is_none());
    }

    #[test]
    fn create_namespace_defaults_optional_fields() {
        let input: CreateNamespace = serde_json::from_str(
            r#"{"name":"express","appId":"SampleApp","format":"yml","dataChangeCreatedBy":"apollo"}"#,
        )
        .unwrap();
        assert!(!input.is_public);
        assert!(input.comment.is_empty());
    }

    #[test]
    fn add_item_rejects_missing_key() {
        let result: Result<AddItem, _> =
            serde_json::from_str(r#"{"value":"v","dataChangeCreatedBy":"apollo"}"#);
        assert!(result.is_err());
    }
}
