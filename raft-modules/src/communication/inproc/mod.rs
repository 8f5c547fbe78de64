pub mod inproc_peer_proxy;
