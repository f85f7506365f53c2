use tracing::info;

use crate::{
    batch::{execute_batch, BatchItemResult, BatchOperation},
    config::ConfigurationSettings,
    error::{ClientError, ClientResult},
    ops::*,
    service::{service_for, KmipOperations},
    transport::KmipConnection,
};

/// The operation-oriented façade over one KMS server.
///
/// Owns the settings and, once opened, the connection. Every operation
/// borrows the connection for exactly one request/response exchange; the
/// dialect service is picked from the settings on each call, so flipping
/// `service_type` between operations (after Discover, say) just works.
pub struct KmipClient {
    pub settings: ConfigurationSettings,
    connection: Option<KmipConnection>,
}

impl KmipClient {
    #[must_use]
    pub const fn new(settings: ConfigurationSettings) -> Self {
        Self {
            settings,
            connection: None,
        }
    }

    /// Open a TLS session with the configured server. An existing session
    /// is closed first.
    pub fn open(&mut self) -> ClientResult<()> {
        if let Some(mut old) = self.connection.take() {
            let _ = old.close();
        }
        let connection = KmipConnection::open(&self.settings)?;
        self.connection = Some(connection);
        Ok(())
    }

    /// Adopt an already-open connection, replacing any current session.
    /// Pairs with [`KmipConnection::from_stream`] for transports that
    /// are established elsewhere.
    pub fn attach(&mut self, connection: KmipConnection) {
        if let Some(mut old) = self.connection.take() {
            let _ = old.close();
        }
        self.connection = Some(connection);
    }

    /// Close the TLS session. Closing an already-closed client is fine.
    pub fn close(&mut self) -> ClientResult<()> {
        if let Some(mut connection) = self.connection.take() {
            connection.close()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    #[must_use]
    pub fn peer(&self) -> Option<&str> {
        self.connection.as_ref().map(KmipConnection::peer)
    }

    /// Attach a cancellation token to the open connection.
    pub fn set_cancel_token(&mut self, token: crate::transport::CancelToken) -> ClientResult<()> {
        self.connection()?.set_cancel_token(token);
        Ok(())
    }

    fn service(&self) -> &'static dyn KmipOperations {
        service_for(self.settings.service_type)
    }

    fn connection(&mut self) -> ClientResult<&mut KmipConnection> {
        self.connection
            .as_mut()
            .ok_or_else(|| ClientError::Usage("no open session, run open first".to_owned()))
    }

    /// Discover the protocol versions supported by the server, adopt the
    /// server's preferred mutually-supported version, and persist it.
    pub fn discover(&mut self, req: &DiscoverRequest) -> ClientResult<DiscoverResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        let response = service.discover(self.connection()?, &settings, req)?;
        if let Some(preferred) = response.supported_versions.first() {
            info!(version = %preferred, "negotiated protocol version");
            self.settings.adopt_version(*preferred);
            if self.settings.save_settings_to_file {
                self.settings.store()?;
            }
        }
        Ok(response)
    }

    pub fn query(&mut self, req: &QueryRequest) -> ClientResult<QueryResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.query(self.connection()?, &settings, req)
    }

    pub fn create_key(&mut self, req: &CreateKeyRequest) -> ClientResult<CreateKeyResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.create_key(self.connection()?, &settings, req)
    }

    pub fn activate_key(&mut self, req: &ActivateKeyRequest) -> ClientResult<ActivateKeyResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.activate_key(self.connection()?, &settings, req)
    }

    pub fn get_key(&mut self, req: &GetKeyRequest) -> ClientResult<GetKeyResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.get_key(self.connection()?, &settings, req)
    }

    pub fn register(&mut self, req: &RegisterRequest) -> ClientResult<RegisterResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.register(self.connection()?, &settings, req)
    }

    pub fn locate(&mut self, req: &LocateRequest) -> ClientResult<LocateResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.locate(self.connection()?, &settings, req)
    }

    pub fn revoke_key(&mut self, req: &RevokeKeyRequest) -> ClientResult<RevokeKeyResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.revoke_key(self.connection()?, &settings, req)
    }

    pub fn destroy_key(&mut self, req: &DestroyKeyRequest) -> ClientResult<DestroyKeyResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.destroy_key(self.connection()?, &settings, req)
    }

    pub fn rekey(&mut self, req: &ReKeyRequest) -> ClientResult<ReKeyResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.rekey(self.connection()?, &settings, req)
    }

    pub fn get_attribute(&mut self, req: &GetAttributeRequest) -> ClientResult<GetAttributeResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.get_attribute(self.connection()?, &settings, req)
    }

    pub fn modify_attribute(
        &mut self,
        req: &ModifyAttributeRequest,
    ) -> ClientResult<ModifyAttributeResponse> {
        let service = self.service();
        let settings = self.settings.clone();
        service.modify_attribute(self.connection()?, &settings, req)
    }

    pub fn set_attribute(&mut self, req: &SetAttributeRequest) -> ClientResult<SetAttributeResponse> {
        // a usage error, caught before the connection is even touched
        if self.settings.service_type == crate::config::ServiceType::Kmip14 {
            return Err(ClientError::Usage(
                "SetAttribute is not supported by the KMIP 1.4 dialect".to_owned(),
            ));
        }
        let service = self.service();
        let settings = self.settings.clone();
        service.set_attribute(self.connection()?, &settings, req)
    }

    /// Run several operations as one batch. Items are processed by the
    /// server in order; the results come back in the same order, one per
    /// item, failures contained to their slot.
    pub fn batch(&mut self, operations: &[BatchOperation]) -> ClientResult<Vec<BatchItemResult>> {
        let service = self.service();
        let settings = self.settings.clone();
        execute_batch(self.connection()?, &settings, service, operations)
    }
}
