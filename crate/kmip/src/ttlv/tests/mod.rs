mod ttlv_wire;
