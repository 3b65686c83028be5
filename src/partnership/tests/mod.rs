mod pairing_service_tests;
