//! Docker-backed sandbox runtime

use async_trait::async_trait;
use bollard::{
    container::LogOutput,
    models::{ContainerCreateBody, HostConfig},
    query_parameters::{
        CreateContainerOptionsBuilder, KillContainerOptionsBuilder, LogsOptionsBuilder,
        RemoveContainerOptionsBuilder, StartContainerOptions, WaitContainerOptions,
    },
    Docker,
};
use futures::StreamExt;

use crate::{config::DockerConfig, constants::DOCKER_CLIENT_TIMEOUT_SECONDS};

use super::{
    runtime::{SandboxLogs, SandboxRuntime, SandboxSpec},
    SandboxError,
};

/// Sandbox runtime that runs each execution in a throwaway Docker container
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Wrap an existing Docker client
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Connect to the daemon socket named in the configuration
    pub fn connect(config: &DockerConfig) -> Result<Self, SandboxError> {
        let docker = Docker::connect_with_socket(
            &config.socket_path,
            DOCKER_CLIENT_TIMEOUT_SECONDS,
            bollard::API_DEFAULT_VERSION,
        )?;

        Ok(Self::new(docker))
    }

    /// Get a reference to the Docker client
    pub fn docker(&self) -> &Docker {
        &self.docker
    }

    fn container_body(spec: &SandboxSpec) -> ContainerCreateBody {
        let host_config = HostConfig {
            binds: Some(vec![format!(
                "{}:{}:rw",
                spec.host_dir.display(),
                spec.mount_point
            )]),
            memory: Some(spec.limits.memory_bytes),
            memory_swap: Some(spec.limits.memory_swap_bytes),
            nano_cpus: Some(spec.limits.nano_cpus),
            pids_limit: Some(spec.limits.pids_limit),
            network_mode: Some("none".to_string()),
            security_opt: Some(vec!["no-new-privileges".to_string()]),
            ..Default::default()
        };

        ContainerCreateBody {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            working_dir: Some(spec.mount_point.clone()),
            network_disabled: Some(true),
            // No TTY so stdout and stderr stay separate streams
            tty: Some(false),
            open_stdin: Some(false),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            env: Some(vec!["LANG=C.UTF-8".to_string()]),
            labels: Some(spec.labels.clone()),
            host_config: Some(host_config),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SandboxRuntime for DockerRuntime {
    async fn create(&self, spec: &SandboxSpec) -> Result<String, SandboxError> {
        let options = CreateContainerOptionsBuilder::default()
            .name(&spec.name)
            .build();

        let container = self
            .docker
            .create_container(Some(options), Self::container_body(spec))
            .await?;

        for warning in &container.warnings {
            tracing::warn!(container_id = %container.id, warning = %warning, "Docker create warning");
        }

        Ok(container.id)
    }

    async fn start(&self, id: &str) -> Result<(), SandboxError> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await?;

        Ok(())
    }

    async fn wait(&self, id: &str) -> Result<i64, SandboxError> {
        let mut stream = self.docker.wait_container(id, None::<WaitContainerOptions>);

        match stream.next().await {
            Some(Ok(response)) => Ok(response.status_code),
            // bollard reports a non-zero exit as an error; it is still a normal exit
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Ok(code),
            Some(Err(e)) => Err(e.into()),
            None => Err(SandboxError::Runtime(format!(
                "wait stream for container {} ended without a status",
                id
            ))),
        }
    }

    async fn kill(&self, id: &str) -> Result<(), SandboxError> {
        let options = KillContainerOptionsBuilder::default()
            .signal("SIGKILL")
            .build();

        self.docker.kill_container(id, Some(options)).await?;

        Ok(())
    }

    async fn logs(&self, id: &str, limit: usize) -> Result<SandboxLogs, SandboxError> {
        let options = LogsOptionsBuilder::default()
            .stdout(true)
            .stderr(true)
            .build();

        let mut stream = self.docker.logs(id, Some(options));
        let mut logs = SandboxLogs::default();

        while let Some(msg) = stream.next().await {
            match msg? {
                LogOutput::StdOut { message } => logs.push_stdout(&message, limit),
                LogOutput::StdErr { message } => logs.push_stderr(&message, limit),
                _ => {}
            }

            if logs.is_full(limit) {
                // Rest of the log is dropped unread
                logs.truncated = true;
                break;
            }
        }

        Ok(logs)
    }

    async fn remove(&self, id: &str) -> Result<(), SandboxError> {
        let options = RemoveContainerOptionsBuilder::default()
            .force(true)
            .build();

        self.docker.remove_container(id, Some(options)).await?;

        Ok(())
    }
}
