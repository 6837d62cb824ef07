mod protocol_test;
