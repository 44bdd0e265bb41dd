//! In-process store for the domain, host and server models.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use overseer_protocol::{
    DomainModel, DomainModelUpdate, HostModelUpdate, ServerGroup, ServerIdentity,
    ServerModelUpdate, ServerUpdateOutcome,
};

use super::{MODEL_TARGET, ModelError, ModelMutator};

#[derive(Debug, Default)]
struct HostModel {
    properties: BTreeMap<String, String>,
    /// Server name to server group.
    servers: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct ServerModel {
    properties: BTreeMap<String, String>,
}

/// Models managed on behalf of one host.
///
/// Each scope sits behind its own lock. Locks are always taken in the order
/// domain, host, servers.
#[derive(Debug)]
pub struct ManagedModels {
    host_name: String,
    domain: Mutex<DomainModel>,
    host: Mutex<HostModel>,
    servers: Mutex<BTreeMap<String, ServerModel>>,
}

impl ManagedModels {
    /// Creates empty models for `host_name`.
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            domain: Mutex::new(DomainModel::default()),
            host: Mutex::new(HostModel::default()),
            servers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Name of the managed host.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Snapshot of the current domain model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Unavailable`] when the domain lock is poisoned.
    pub fn domain(&self) -> Result<DomainModel, ModelError> {
        Ok(lock(&self.domain, "domain")?.clone())
    }

    /// Every server declared on the host.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Unavailable`] when the host lock is poisoned.
    pub fn servers(&self) -> Result<Vec<ServerIdentity>, ModelError> {
        let host = lock(&self.host, "host")?;
        Ok(self.identities(&host))
    }

    /// Current value of a host property.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Unavailable`] when the host lock is poisoned.
    pub fn host_property(&self, name: &str) -> Result<Option<String>, ModelError> {
        Ok(lock(&self.host, "host")?.properties.get(name).cloned())
    }

    /// Current value of a property on the named server; `None` when either
    /// the server or the property is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Unavailable`] when the servers lock is poisoned.
    pub fn server_property(&self, server: &str, name: &str) -> Result<Option<String>, ModelError> {
        Ok(lock(&self.servers, "servers")?
            .get(server)
            .and_then(|model| model.properties.get(name).cloned()))
    }

    fn identity(&self, server: &str, group: &str) -> ServerIdentity {
        ServerIdentity {
            host_name: self.host_name.clone(),
            server_group: group.to_owned(),
            server_name: server.to_owned(),
        }
    }

    fn identities(&self, host: &HostModel) -> Vec<ServerIdentity> {
        host.servers
            .iter()
            .map(|(server, group)| self.identity(server, group))
            .collect()
    }

    fn all_servers(&self) -> Result<Vec<ServerIdentity>, ModelError> {
        self.servers()
    }
}

impl ModelMutator for ManagedModels {
    /// Installs `model` wholesale. Unlike `RemoveServerGroup`, the
    /// replacement is not refused when host servers still reference a group
    /// it drops; each such server is logged instead.
    fn set_domain(&self, model: DomainModel) -> Result<(), ModelError> {
        let mut domain = lock(&self.domain, "domain")?;
        let host = lock(&self.host, "host")?;
        for (server, group) in dangling_servers(&model, &host) {
            warn!(
                target: MODEL_TARGET,
                server,
                group,
                "server references a group missing from the installed domain"
            );
        }
        drop(host);
        info!(
            target: MODEL_TARGET,
            properties = model.properties.len(),
            server_groups = model.server_groups.len(),
            "domain model installed"
        );
        *domain = model;
        Ok(())
    }

    fn apply_domain_update(
        &self,
        update: DomainModelUpdate,
    ) -> Result<Vec<ServerIdentity>, ModelError> {
        let mut domain = lock(&self.domain, "domain")?;
        let affected = match update {
            DomainModelUpdate::SetProperty { name, value } => {
                domain.properties.insert(name, value);
                self.all_servers()?
            }
            DomainModelUpdate::RemoveProperty { name } => {
                if domain.properties.remove(&name).is_none() {
                    return Err(ModelError::rejected(format!(
                        "domain property '{name}' is not defined"
                    )));
                }
                self.all_servers()?
            }
            DomainModelUpdate::AddServerGroup { name, profile } => {
                match domain.server_groups.entry(name) {
                    Entry::Occupied(entry) => {
                        return Err(ModelError::rejected(format!(
                            "server group '{}' already exists",
                            entry.key()
                        )));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(ServerGroup { profile });
                    }
                }
                Vec::new()
            }
            DomainModelUpdate::RemoveServerGroup { name } => {
                if !domain.server_groups.contains_key(&name) {
                    return Err(ModelError::rejected(format!(
                        "server group '{name}' is not defined"
                    )));
                }
                let host = lock(&self.host, "host")?;
                if let Some(server) = host
                    .servers
                    .iter()
                    .find_map(|(server, group)| (*group == name).then_some(server))
                {
                    return Err(ModelError::rejected(format!(
                        "server group '{name}' is still used by server '{server}'"
                    )));
                }
                domain.server_groups.remove(&name);
                Vec::new()
            }
        };
        debug!(
            target: MODEL_TARGET,
            affected = affected.len(),
            "domain update applied"
        );
        Ok(affected)
    }

    fn apply_host_update(&self, update: HostModelUpdate) -> Result<Vec<ServerIdentity>, ModelError> {
        let affected = match update {
            HostModelUpdate::SetProperty { name, value } => {
                let mut host = lock(&self.host, "host")?;
                host.properties.insert(name, value);
                self.identities(&host)
            }
            HostModelUpdate::RemoveProperty { name } => {
                let mut host = lock(&self.host, "host")?;
                if host.properties.remove(&name).is_none() {
                    return Err(ModelError::rejected(format!(
                        "host property '{name}' is not defined"
                    )));
                }
                self.identities(&host)
            }
            HostModelUpdate::AddServer { name, group } => {
                let domain = lock(&self.domain, "domain")?;
                if !domain.server_groups.contains_key(&group) {
                    return Err(ModelError::rejected(format!(
                        "server group '{group}' is not defined"
                    )));
                }
                let mut host = lock(&self.host, "host")?;
                if host.servers.contains_key(&name) {
                    return Err(ModelError::rejected(format!(
                        "server '{name}' already exists on host '{}'",
                        self.host_name
                    )));
                }
                lock(&self.servers, "servers")?.insert(name.clone(), ServerModel::default());
                let identity = self.identity(&name, &group);
                host.servers.insert(name, group);
                vec![identity]
            }
            HostModelUpdate::RemoveServer { name } => {
                let mut host = lock(&self.host, "host")?;
                let Some(group) = host.servers.remove(&name) else {
                    return Err(ModelError::rejected(format!(
                        "server '{name}' is not defined on host '{}'",
                        self.host_name
                    )));
                };
                lock(&self.servers, "servers")?.remove(&name);
                vec![self.identity(&name, &group)]
            }
        };
        debug!(
            target: MODEL_TARGET,
            affected = affected.len(),
            "host update applied"
        );
        Ok(affected)
    }

    fn apply_server_update(
        &self,
        server_name: &str,
        update: ServerModelUpdate,
    ) -> Result<ServerUpdateOutcome, ModelError> {
        let mut servers = lock(&self.servers, "servers")?;
        let server = servers.get_mut(server_name).ok_or_else(|| {
            ModelError::rejected(format!(
                "server '{server_name}' is not defined on host '{}'",
                self.host_name
            ))
        })?;
        let previous = match update {
            ServerModelUpdate::SetProperty { name, value } => server.properties.insert(name, value),
            ServerModelUpdate::RemoveProperty { name } => {
                let removed = server.properties.remove(&name);
                if removed.is_none() {
                    return Err(ModelError::rejected(format!(
                        "property '{name}' is not defined on server '{server_name}'"
                    )));
                }
                removed
            }
        };
        debug!(
            target: MODEL_TARGET,
            server = server_name,
            "server update applied"
        );
        Ok(ServerUpdateOutcome { previous })
    }
}

/// Host servers whose group is not declared in `domain`, as
/// `(server, group)` pairs.
fn dangling_servers<'a>(domain: &DomainModel, host: &'a HostModel) -> Vec<(&'a str, &'a str)> {
    host.servers
        .iter()
        .filter(|(_, group)| !domain.server_groups.contains_key(group.as_str()))
        .map(|(server, group)| (server.as_str(), group.as_str()))
        .collect()
}

fn lock<'a, T>(mutex: &'a Mutex<T>, scope: &str) -> Result<MutexGuard<'a, T>, ModelError> {
    mutex
        .lock()
        .map_err(|_| ModelError::unavailable(format!("{scope} model lock poisoned")))
}

#[cfg(test)]
mod tests {
    use std::thread;

    use rstest::{fixture, rstest};

    use super::*;

    fn failure_message(error: ModelError) -> String {
        match error {
            ModelError::UpdateFailed(failure) => failure.message,
            other => panic!("expected a rejected update, got {other:?}"),
        }
    }

    /// Host "local" with group "main" and server "srv1".
    #[fixture]
    fn models() -> ManagedModels {
        let models = ManagedModels::new("local");
        models
            .apply_domain_update(DomainModelUpdate::AddServerGroup {
                name: "main".to_owned(),
                profile: "default".to_owned(),
            })
            .expect("add group");
        models
            .apply_host_update(HostModelUpdate::AddServer {
                name: "srv1".to_owned(),
                group: "main".to_owned(),
            })
            .expect("add server");
        models
    }

    #[rstest]
    fn domain_property_affects_every_server(models: ManagedModels) {
        let affected = models
            .apply_domain_update(DomainModelUpdate::SetProperty {
                name: "jboss.bind".to_owned(),
                value: "0.0.0.0".to_owned(),
            })
            .expect("set property");
        assert_eq!(
            affected
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["local/main/srv1".to_owned()]
        );
        let domain = models.domain().expect("domain snapshot");
        assert_eq!(
            domain.properties.get("jboss.bind").map(String::as_str),
            Some("0.0.0.0")
        );
    }

    #[rstest]
    fn removing_undefined_domain_property_is_rejected(models: ManagedModels) {
        let error = models
            .apply_domain_update(DomainModelUpdate::RemoveProperty {
                name: "missing".to_owned(),
            })
            .expect_err("undefined property");
        assert_eq!(
            failure_message(error),
            "domain property 'missing' is not defined"
        );
    }

    #[rstest]
    fn duplicate_server_group_is_rejected(models: ManagedModels) {
        let error = models
            .apply_domain_update(DomainModelUpdate::AddServerGroup {
                name: "main".to_owned(),
                profile: "other".to_owned(),
            })
            .expect_err("duplicate group");
        assert_eq!(failure_message(error), "server group 'main' already exists");
        let domain = models.domain().expect("domain snapshot");
        assert_eq!(
            domain.server_groups.get("main").map(|group| group.profile.as_str()),
            Some("default")
        );
    }

    #[rstest]
    fn server_group_in_use_cannot_be_removed(models: ManagedModels) {
        let remove_group = || {
            models.apply_domain_update(DomainModelUpdate::RemoveServerGroup {
                name: "main".to_owned(),
            })
        };
        let error = remove_group().expect_err("group in use");
        assert_eq!(
            failure_message(error),
            "server group 'main' is still used by server 'srv1'"
        );

        models
            .apply_host_update(HostModelUpdate::RemoveServer {
                name: "srv1".to_owned(),
            })
            .expect("remove server");
        assert!(remove_group().expect("remove group").is_empty());
    }

    #[rstest]
    fn server_requires_known_group(models: ManagedModels) {
        let error = models
            .apply_host_update(HostModelUpdate::AddServer {
                name: "srv2".to_owned(),
                group: "backup".to_owned(),
            })
            .expect_err("unknown group");
        assert_eq!(failure_message(error), "server group 'backup' is not defined");
        assert_eq!(models.servers().expect("servers").len(), 1);
    }

    #[rstest]
    fn duplicate_server_is_rejected(models: ManagedModels) {
        let error = models
            .apply_host_update(HostModelUpdate::AddServer {
                name: "srv1".to_owned(),
                group: "main".to_owned(),
            })
            .expect_err("duplicate server");
        assert_eq!(
            failure_message(error),
            "server 'srv1' already exists on host 'local'"
        );
    }

    #[rstest]
    fn host_property_round_trip(models: ManagedModels) {
        models
            .apply_host_update(HostModelUpdate::SetProperty {
                name: "zone".to_owned(),
                value: "eu".to_owned(),
            })
            .expect("set host property");
        assert_eq!(
            models.host_property("zone").expect("read").as_deref(),
            Some("eu")
        );
        models
            .apply_host_update(HostModelUpdate::RemoveProperty {
                name: "zone".to_owned(),
            })
            .expect("remove host property");
        assert_eq!(models.host_property("zone").expect("read"), None);
    }

    #[rstest]
    fn server_updates_report_previous_value(models: ManagedModels) {
        let set = |value: &str| {
            models.apply_server_update(
                "srv1",
                ServerModelUpdate::SetProperty {
                    name: "port".to_owned(),
                    value: value.to_owned(),
                },
            )
        };
        assert_eq!(set("8080").expect("first set").previous, None);
        assert_eq!(
            set("9090").expect("second set").previous.as_deref(),
            Some("8080")
        );

        let removed = models
            .apply_server_update(
                "srv1",
                ServerModelUpdate::RemoveProperty {
                    name: "port".to_owned(),
                },
            )
            .expect("remove property");
        assert_eq!(removed.previous.as_deref(), Some("9090"));
        assert_eq!(models.server_property("srv1", "port").expect("read"), None);
    }

    #[rstest]
    #[case::unknown_server("srv9", "port", "server 'srv9' is not defined on host 'local'")]
    #[case::undefined_property("srv1", "port", "property 'port' is not defined on server 'srv1'")]
    fn invalid_server_removal_is_rejected(
        models: ManagedModels,
        #[case] server: &str,
        #[case] property: &str,
        #[case] expected: &str,
    ) {
        let error = models
            .apply_server_update(
                server,
                ServerModelUpdate::RemoveProperty {
                    name: property.to_owned(),
                },
            )
            .expect_err("rejected removal");
        assert_eq!(failure_message(error), expected);
    }

    #[rstest]
    fn removed_server_drops_its_model(models: ManagedModels) {
        models
            .apply_server_update(
                "srv1",
                ServerModelUpdate::SetProperty {
                    name: "port".to_owned(),
                    value: "8080".to_owned(),
                },
            )
            .expect("set property");
        models
            .apply_host_update(HostModelUpdate::RemoveServer {
                name: "srv1".to_owned(),
            })
            .expect("remove server");
        assert_eq!(models.server_property("srv1", "port").expect("read"), None);
        assert!(models.servers().expect("servers").is_empty());
    }

    #[rstest]
    fn poisoned_lock_reports_unavailable(models: ManagedModels) {
        thread::scope(|scope| {
            let poisoner = scope.spawn(|| {
                let _guard = models.servers.lock().expect("servers lock");
                panic!("poison the servers lock");
            });
            assert!(poisoner.join().is_err());
        });

        let error = models
            .apply_server_update(
                "srv1",
                ServerModelUpdate::RemoveProperty {
                    name: "port".to_owned(),
                },
            )
            .expect_err("poisoned lock");
        assert!(matches!(error, ModelError::Unavailable { .. }));
    }

    #[rstest]
    fn full_domain_replaces_previous_model(models: ManagedModels) {
        let mut replacement = DomainModel::default();
        replacement
            .properties
            .insert("release".to_owned(), "2".to_owned());
        models.set_domain(replacement.clone()).expect("set domain");
        assert_eq!(models.domain().expect("domain snapshot"), replacement);
    }

    #[rstest]
    fn full_domain_keeps_servers_of_dropped_groups(models: ManagedModels) {
        let mut replacement = DomainModel::default();
        replacement.server_groups.insert(
            "other".to_owned(),
            ServerGroup {
                profile: "default".to_owned(),
            },
        );

        {
            let current = models.domain.lock().expect("domain lock");
            let host = models.host.lock().expect("host lock");
            assert!(dangling_servers(&current, &host).is_empty());
            assert_eq!(dangling_servers(&replacement, &host), vec![("srv1", "main")]);
        }

        models.set_domain(replacement).expect("set domain");
        assert_eq!(
            models
                .servers()
                .expect("servers")
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["local/main/srv1".to_owned()]
        );
    }

    #[rstest]
    fn concurrent_mutations_across_scopes_complete(models: ManagedModels) {
        const ROUNDS: usize = 50;

        thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..ROUNDS {
                    models
                        .apply_domain_update(DomainModelUpdate::SetProperty {
                            name: "round".to_owned(),
                            value: round.to_string(),
                        })
                        .expect("domain property");
                    let _ = models.apply_domain_update(DomainModelUpdate::RemoveServerGroup {
                        name: "main".to_owned(),
                    });
                }
            });
            scope.spawn(|| {
                for round in 0..ROUNDS {
                    let name = format!("extra{round}");
                    models
                        .apply_host_update(HostModelUpdate::AddServer {
                            name: name.clone(),
                            group: "main".to_owned(),
                        })
                        .expect("add server");
                    models
                        .apply_host_update(HostModelUpdate::RemoveServer { name })
                        .expect("remove server");
                }
            });
            scope.spawn(|| {
                for round in 0..ROUNDS {
                    models
                        .apply_server_update(
                            "srv1",
                            ServerModelUpdate::SetProperty {
                                name: "port".to_owned(),
                                value: round.to_string(),
                            },
                        )
                        .expect("server property");
                }
            });
            scope.spawn(|| {
                for _ in 0..ROUNDS {
                    models
                        .set_domain(models.domain().expect("domain snapshot"))
                        .expect("reinstall domain");
                }
            });
        });

        let last = (ROUNDS - 1).to_string();
        assert_eq!(
            models.server_property("srv1", "port").expect("read"),
            Some(last)
        );
        let domain = models.domain().expect("domain");
        assert!(domain.properties.contains_key("round"));
        assert!(domain.server_groups.contains_key("main"));
        assert_eq!(models.servers().expect("servers").len(), 1);
    }
}
