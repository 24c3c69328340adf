//! Generated messages and stubs for the `user.User` gRPC service.

tonic::include_proto!("user");
