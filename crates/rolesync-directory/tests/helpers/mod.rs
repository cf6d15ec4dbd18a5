pub mod mock_scim_server;
