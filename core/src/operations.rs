//! Endpoint adapters: one URL template and one executor call each.

use crate::client::{normalize_namespace, OpenApiClient, NO_BODY};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{
    AddItemRequest, App, AppNamespace, CreateNamespaceRequest, EnvWithClusters, Item, Namespace,
    NamespaceLock, PublishReleaseRequest, Release, UpdateItemRequest,
};

impl OpenApiClient {
    /// Every application visible to the token.
    pub fn get_apps(&self) -> Result<Vec<App>, ApiError> {
        let url = self.endpoint("apps");
        self.call(HttpMethod::Get, &url, NO_BODY)
    }

    pub fn get_env_clusters(&self, app_id: &str) -> Result<Vec<EnvWithClusters>, ApiError> {
        let url = self.endpoint(&format!("apps/{app_id}/envclusters"));
        self.call(HttpMethod::Get, &url, NO_BODY)
    }

    pub fn get_namespaces(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
    ) -> Result<Vec<Namespace>, ApiError> {
        let url = self.endpoint(&format!(
            "envs/{env}/apps/{app_id}/clusters/{cluster}/namespaces"
        ));
        self.call(HttpMethod::Get, &url, NO_BODY)
    }

    pub fn get_namespace(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
    ) -> Result<Namespace, ApiError> {
        let url = self.namespace_url(env, app_id, cluster, namespace, "");
        self.call(HttpMethod::Get, &url, NO_BODY)
    }

    /// Creates an application-level namespace; it is not yet bound to any
    /// environment or cluster.
    pub fn create_namespace(
        &self,
        request: &CreateNamespaceRequest,
    ) -> Result<AppNamespace, ApiError> {
        let url = self.endpoint(&format!(
            "apps/{}/appnamespaces?appendNamespacePrefix={}",
            request.app_id, request.append_namespace_prefix
        ));
        self.call(HttpMethod::Post, &url, Some(request))
    }

    pub fn get_namespace_lock(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
    ) -> Result<NamespaceLock, ApiError> {
        let url = self.namespace_url(env, app_id, cluster, namespace, "/lock");
        self.call(HttpMethod::Get, &url, NO_BODY)
    }

    pub fn add_item(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
        request: &AddItemRequest,
    ) -> Result<Item, ApiError> {
        let url = self.namespace_url(env, app_id, cluster, namespace, "/items");
        self.call(HttpMethod::Post, &url, Some(request))
    }

    /// Fails with a 404 when the key does not exist yet.
    pub fn update_item(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
        request: &UpdateItemRequest,
    ) -> Result<(), ApiError> {
        let suffix = format!("/items/{}", request.key);
        let url = self.namespace_url(env, app_id, cluster, namespace, &suffix);
        self.call_no_content(HttpMethod::Put, &url, Some(request))
    }

    pub fn create_or_update_item(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
        request: &UpdateItemRequest,
    ) -> Result<(), ApiError> {
        let suffix = format!("/items/{}?createIfNotExists=true", request.key);
        let url = self.namespace_url(env, app_id, cluster, namespace, &suffix);
        self.call_no_content(HttpMethod::Put, &url, Some(request))
    }

    pub fn delete_item(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
        key: &str,
        operator: &str,
    ) -> Result<(), ApiError> {
        let suffix = format!("/items/{key}?operator={operator}");
        let url = self.namespace_url(env, app_id, cluster, namespace, &suffix);
        self.call_no_content(HttpMethod::Delete, &url, NO_BODY)
    }

    pub fn publish_release(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
        request: &PublishReleaseRequest,
    ) -> Result<Release, ApiError> {
        let url = self.namespace_url(env, app_id, cluster, namespace, "/releases");
        self.call(HttpMethod::Post, &url, Some(request))
    }

    /// The most recent release of the namespace.
    pub fn get_release(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
    ) -> Result<Release, ApiError> {
        let url = self.namespace_url(env, app_id, cluster, namespace, "/releases/latest");
        self.call(HttpMethod::Get, &url, NO_BODY)
    }

    fn namespace_url(
        &self,
        env: &str,
        app_id: &str,
        cluster: &str,
        namespace: &str,
        suffix: &str,
    ) -> String {
        let namespace = normalize_namespace(namespace);
        self.endpoint(&format!(
            "envs/{env}/apps/{app_id}/clusters/{cluster}/namespaces/{namespace}{suffix}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::options::ClientOptions;

    use super::*;

    fn recording_client(
        body: &'static str,
    ) -> (OpenApiClient, Arc<Mutex<Vec<HttpRequest>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&sent);
        let options = ClientOptions::new().with_transport(
            move |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
                recorder.lock().unwrap().push(req.clone());
                Ok(HttpResponse::new(200, body))
            },
        );
        (OpenApiClient::with_options("localhost:8070", "tok", options), sent)
    }

    fn last(sent: &Arc<Mutex<Vec<HttpRequest>>>) -> HttpRequest {
        sent.lock().unwrap().last().cloned().unwrap()
    }

    #[test]
    fn list_namespaces_targets_env_app_cluster() {
        let (client, sent) = recording_client("[]");
        let namespaces = client.get_namespaces("DEV", "SampleApp", "default").unwrap();
        assert!(namespaces.is_empty());

        let req = last(&sent);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:8070/openapi/v1/envs/DEV/apps/SampleApp/clusters/default/namespaces"
        );
        assert_eq!(req.header("Authorization"), Some("tok"));
    }

    #[test]
    fn properties_suffix_is_dropped_from_paths() {
        let (client, sent) = recording_client("{}");
        client
            .get_namespace("DEV", "SampleApp", "default", "application.properties")
            .unwrap();
        assert!(last(&sent).url.ends_with("/namespaces/application"));

        client
            .get_release("DEV", "SampleApp", "default", "express.yml")
            .unwrap();
        assert!(last(&sent).url.ends_with("/namespaces/express.yml/releases/latest"));
    }

    #[test]
    fn create_namespace_puts_prefix_flag_in_query() {
        let (client, sent) = recording_client(r#"{"name":"express","format":"yml"}"#);
        let created = client
            .create_namespace(&CreateNamespaceRequest {
                name: "express".to_string(),
                app_id: "SampleApp".to_string(),
                format: crate::types::Format::Yml,
                append_namespace_prefix: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(created.name, "express");

        let req = last(&sent);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "http://localhost:8070/openapi/v1/apps/SampleApp/appnamespaces?appendNamespacePrefix=true"
        );
        assert!(req.body.unwrap().contains(r#""format":"yml""#));
    }

    #[test]
    fn item_writes_use_key_in_path() {
        let (client, sent) = recording_client("");
        let request = UpdateItemRequest {
            key: "timeout".to_string(),
            value: "100".to_string(),
            ..Default::default()
        };

        client
            .update_item("DEV", "SampleApp", "default", "application", &request)
            .unwrap();
        let req = last(&sent);
        assert_eq!(req.method, HttpMethod::Put);
        assert!(req.url.ends_with("/namespaces/application/items/timeout"));

        client
            .create_or_update_item("DEV", "SampleApp", "default", "application", &request)
            .unwrap();
        assert!(last(&sent)
            .url
            .ends_with("/items/timeout?createIfNotExists=true"));

        client
            .delete_item("DEV", "SampleApp", "default", "application", "timeout", "apollo")
            .unwrap();
        let req = last(&sent);
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.url.ends_with("/items/timeout?operator=apollo"));
        assert!(req.body.is_none());
    }

    #[test]
    fn item_keys_with_spaces_are_encoded_in_path() {
        let (client, sent) = recording_client("");
        let request = UpdateItemRequest {
            key: "log level".to_string(),
            value: "debug".to_string(),
            ..Default::default()
        };
        client
            .update_item("DEV", "SampleApp", "default", "application", &request)
            .unwrap();
        assert!(last(&sent).url.ends_with("/items/log%20level"));

        client
            .delete_item("DEV", "SampleApp", "default", "application", "超时", "apollo")
            .unwrap();
        assert!(last(&sent)
            .url
            .ends_with("/items/%E8%B6%85%E6%97%B6?operator=apollo"));
    }

    #[test]
    fn publish_release_decodes_release() {
        let (client, sent) =
            recording_client(r#"{"name":"r1","configurations":{"timeout":"100"}}"#);
        let release = client
            .publish_release(
                "DEV",
                "SampleApp",
                "default",
                "application",
                &PublishReleaseRequest {
                    release_title: "r1".to_string(),
                    release_comment: String::new(),
                    released_by: "apollo".to_string(),
                },
            )
            .unwrap();
        assert_eq!(release.name, "r1");
        assert_eq!(release.configurations["timeout"], "100");
        assert!(last(&sent).url.ends_with("/namespaces/application/releases"));
    }

    #[test]
    fn app_level_endpoints() {
        let (client, sent) = recording_client("[]");
        client.get_apps().unwrap();
        assert_eq!(last(&sent).url, "http://localhost:8070/openapi/v1/apps");

        client.get_env_clusters("SampleApp").unwrap();
        assert_eq!(
            last(&sent).url,
            "http://localhost:8070/openapi/v1/apps/SampleApp/envclusters"
        );
    }
}
