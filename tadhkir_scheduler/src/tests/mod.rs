mod timezone_tests;
