mod execution_test;
